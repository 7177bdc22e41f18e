pub mod affiliate_link;
pub mod affiliate_partner;
pub mod blocked_ip;
pub mod click;

pub use affiliate_link::Entity as AffiliateLinkEntity;
pub use affiliate_partner::Entity as AffiliatePartnerEntity;
pub use blocked_ip::Entity as BlockedIpEntity;
pub use click::Entity as ClickEntity;
