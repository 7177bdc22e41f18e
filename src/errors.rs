use std::fmt;

#[derive(Debug, Clone)]
pub enum AffilinkError {
    ConfigLoad(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    DateParse(String),
}

impl AffilinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AffilinkError::ConfigLoad(_) => "E001",
            AffilinkError::DatabaseConfig(_) => "E002",
            AffilinkError::DatabaseConnection(_) => "E003",
            AffilinkError::DatabaseOperation(_) => "E004",
            AffilinkError::FileOperation(_) => "E005",
            AffilinkError::Validation(_) => "E006",
            AffilinkError::NotFound(_) => "E007",
            AffilinkError::DateParse(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AffilinkError::ConfigLoad(_) => "Configuration Error",
            AffilinkError::DatabaseConfig(_) => "Database Configuration Error",
            AffilinkError::DatabaseConnection(_) => "Database Connection Error",
            AffilinkError::DatabaseOperation(_) => "Database Operation Error",
            AffilinkError::FileOperation(_) => "File Operation Error",
            AffilinkError::Validation(_) => "Validation Error",
            AffilinkError::NotFound(_) => "Resource Not Found",
            AffilinkError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AffilinkError::ConfigLoad(msg)
            | AffilinkError::DatabaseConfig(msg)
            | AffilinkError::DatabaseConnection(msg)
            | AffilinkError::DatabaseOperation(msg)
            | AffilinkError::FileOperation(msg)
            | AffilinkError::Validation(msg)
            | AffilinkError::NotFound(msg)
            | AffilinkError::DateParse(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式与日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AffilinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AffilinkError {}

// 便捷的构造函数
impl AffilinkError {
    pub fn config_load<T: Into<String>>(msg: T) -> Self {
        AffilinkError::ConfigLoad(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        AffilinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        AffilinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        AffilinkError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AffilinkError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AffilinkError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AffilinkError::NotFound(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        AffilinkError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for AffilinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        AffilinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for AffilinkError {
    fn from(err: std::io::Error) -> Self {
        AffilinkError::FileOperation(err.to_string())
    }
}

impl From<chrono::ParseError> for AffilinkError {
    fn from(err: chrono::ParseError) -> Self {
        AffilinkError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AffilinkError>;
