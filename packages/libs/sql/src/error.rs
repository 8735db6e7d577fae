//! acf-sql 에러 타입

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 쿼리 필터/리포트 에러
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] acf_core::Error),

    #[error("missing query parameter: {name}")]
    MissingParameter { name: String },

    #[error("unsupported parameter value for '{name}'")]
    UnsupportedParameter { name: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    /// 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            Error::Core(e) => e.code(),
            Error::MissingParameter { .. } => "MISSING_PARAMETER",
            Error::UnsupportedParameter { .. } => "UNSUPPORTED_PARAMETER",
            Error::Database(_) => "DATABASE_ERROR",
        }
    }

    /// 코어 에러 참조
    pub fn as_core(&self) -> Option<&acf_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            _ => None,
        }
    }
}
