pub mod health;
pub mod redirect;

pub use health::{AppStartTime, HealthService, health_routes};
pub use redirect::{
    RedirectError, RedirectOutcome, RedirectRequest, RedirectService, Recording, redirect_routes,
};
