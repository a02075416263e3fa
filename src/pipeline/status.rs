//! User-facing status line.

use serde::Serialize;

use crate::error::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusLevel {
    pub fn color(self) -> &'static str {
        match self {
            StatusLevel::Info => "#555555",
            StatusLevel::Success => "#2e7d32",
            StatusLevel::Warning | StatusLevel::Error => "#d63333",
        }
    }
}

/// Text plus color for the status region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
    pub color: &'static str,
}

impl Status {
    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
            color: level.color(),
        }
    }

    pub fn idle() -> Self {
        Self::new(StatusLevel::Info, "")
    }

    pub fn searching() -> Self {
        Self::new(StatusLevel::Info, "Buscando CEBAs en el distrito...")
    }

    pub fn located(count: usize) -> Self {
        Self::new(
            StatusLevel::Success,
            format!("Se encontraron {} CEBAs en el distrito.", count),
        )
    }

    pub fn from_error(err: &SearchError) -> Self {
        match err {
            SearchError::InputMissing => {
                Self::new(StatusLevel::Warning, "Por favor, ingresa un distrito.")
            }
            SearchError::StoreNotReady => Self::new(
                StatusLevel::Error,
                "La base de datos aún no está cargada.",
            ),
            SearchError::NoMatches(_) => Self::new(
                StatusLevel::Warning,
                "No se encontraron CEBAs para ese distrito.",
            ),
            SearchError::NoneGeocoded(_) => Self::new(
                StatusLevel::Warning,
                "No se pudo ubicar ningún CEBA en ese distrito.",
            ),
            SearchError::Busy => Self::new(StatusLevel::Warning, "Ya hay una búsqueda en curso."),
        }
    }

    pub fn from_outcome(outcome: &Result<usize, SearchError>) -> Self {
        match outcome {
            Ok(count) => Self::located(*count),
            Err(e) => Self::from_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_condition_has_distinct_text() {
        let statuses = [
            Status::searching(),
            Status::located(3),
            Status::from_error(&SearchError::InputMissing),
            Status::from_error(&SearchError::StoreNotReady),
            Status::from_error(&SearchError::NoMatches("x".into())),
            Status::from_error(&SearchError::NoneGeocoded(2)),
            Status::from_error(&SearchError::Busy),
        ];

        for (i, a) in statuses.iter().enumerate() {
            for b in &statuses[i + 1..] {
                assert_ne!(a.text, b.text);
            }
        }
    }

    #[test]
    fn test_located_count_in_text() {
        let status = Status::from_outcome(&Ok(4));
        assert_eq!(status.level, StatusLevel::Success);
        assert!(status.text.contains('4'));
    }
}
