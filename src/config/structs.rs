use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接与重试
/// - cache: 链接 / 黑名单读缓存
/// - logging: 日志配置
/// - tracking: 跳转、会话 Cookie、机器人与欺诈识别、点击记录
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > TOML > 默认值
    /// ENV 前缀：AFL，分隔符：__
    /// 示例：AFL__SERVER__PORT=9999
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("AFL")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 读缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 短码 → 链接记录的缓存 TTL（秒），0 表示关闭
    #[serde(default = "default_link_ttl")]
    pub link_ttl_secs: u64,
    /// IP 黑名单判定结果的缓存 TTL（秒），0 表示关闭
    #[serde(default = "default_blocklist_ttl")]
    pub blocklist_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 跳转与归因配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 无效链接时的回退地址，会附加 `?error=<code>`
    #[serde(default = "default_homepage_url")]
    pub homepage_url: String,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
    /// 归因 Cookie 名称前缀，实际名称为 `<prefix><partner_id>`
    #[serde(default = "default_attribution_cookie_prefix")]
    pub attribution_cookie_prefix: String,
    /// 合作方未配置或配置 <= 0 时使用
    #[serde(default = "default_attribution_days")]
    pub default_attribution_days: i64,
    /// 生产环境必须为 true
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub fraud: FraudConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// 机器人识别配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotConfig {
    /// 追加到内置特征列表的 UA 片段（大小写不敏感）
    #[serde(default)]
    pub extra_signatures: Vec<String>,
}

/// 欺诈评分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudConfig {
    /// 回看窗口（秒）
    #[serde(default = "default_fraud_window_secs")]
    pub window_secs: u64,
    /// 窗口内同 IP 同链接允许的点击数
    #[serde(default = "default_max_clicks_per_ip")]
    pub max_clicks_per_ip: usize,
    /// 窗口内同会话同链接允许的点击数
    #[serde(default = "default_max_clicks_per_session")]
    pub max_clicks_per_session: usize,
    #[serde(default = "default_min_user_agent_len")]
    pub min_user_agent_len: usize,
    /// 分数 >= deny_score 时拒绝记录
    #[serde(default = "default_deny_score")]
    pub deny_score: u8,
}

/// 点击记录器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// 单次写入超时（毫秒）
    #[serde(default = "default_insert_timeout_ms")]
    pub insert_timeout_ms: u64,
    #[serde(default = "default_recorder_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://affilink.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_link_ttl() -> u64 {
    60
}

fn default_blocklist_ttl() -> u64 {
    60
}

fn default_cache_capacity() -> u64 {
    10000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_homepage_url() -> String {
    "/".to_string()
}

fn default_session_cookie_name() -> String {
    "aff_sid".to_string()
}

fn default_session_ttl_days() -> i64 {
    30
}

fn default_attribution_cookie_prefix() -> String {
    "aff_ref_".to_string()
}

fn default_attribution_days() -> i64 {
    30
}

fn default_cookie_secure() -> bool {
    true
}

fn default_fraud_window_secs() -> u64 {
    300
}

fn default_max_clicks_per_ip() -> usize {
    5
}

fn default_max_clicks_per_session() -> usize {
    3
}

fn default_min_user_agent_len() -> usize {
    10
}

fn default_deny_score() -> u8 {
    50
}

fn default_queue_capacity() -> usize {
    10000
}

fn default_insert_timeout_ms() -> u64 {
    3000
}

fn default_recorder_max_retries() -> u32 {
    3
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            link_ttl_secs: default_link_ttl(),
            blocklist_ttl_secs: default_blocklist_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            homepage_url: default_homepage_url(),
            session_cookie_name: default_session_cookie_name(),
            session_ttl_days: default_session_ttl_days(),
            attribution_cookie_prefix: default_attribution_cookie_prefix(),
            default_attribution_days: default_attribution_days(),
            cookie_secure: default_cookie_secure(),
            bot: BotConfig::default(),
            fraud: FraudConfig::default(),
            recorder: RecorderConfig::default(),
        }
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            window_secs: default_fraud_window_secs(),
            max_clicks_per_ip: default_max_clicks_per_ip(),
            max_clicks_per_session: default_max_clicks_per_session(),
            min_user_agent_len: default_min_user_agent_len(),
            deny_score: default_deny_score(),
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            insert_timeout_ms: default_insert_timeout_ms(),
            max_retries: default_recorder_max_retries(),
            base_delay_ms: default_retry_base_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}
