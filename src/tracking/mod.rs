//! 点击归因流水线
//!
//! 解析短码 → IP 黑名单 → 机器人/欺诈识别 → 会话与归因 Cookie → 异步记录点击。
//! 编排逻辑在 `api::services::redirect`，这里是各个环节的组件。

pub mod device;
pub mod heuristics;
pub mod recorder;
pub mod resolver;
pub mod session;

pub use device::DeviceInfo;
pub use heuristics::{
    BotClassifier, BotVerdict, FraudAssessment, FraudScorer, RecentClickFraudScorer,
    SignatureBotClassifier,
};
pub use recorder::{ClickRecorder, ClickSink, RecorderStats};
pub use resolver::{LinkResolver, Resolution};
pub use session::{AttributionCookie, SessionManager, SessionToken};
