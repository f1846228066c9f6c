//! Frontend half of the level resolver: performs the HTTP call and folds
//! every possible answer into [`LevelOutcome`]. Nothing here returns `Err`.

use contracts::dashboards::d404_group_drilldown::{
    DrilldownResponse, DrilldownRow, ErrorKind, LeafRecord, LevelId, PanelItem,
};
use thiserror::Error;

use super::api;
use super::panel_stack::{FetchRequest, FetchTicket};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrilldownError {
    #[error("Ошибка связи с сервисом агрегации: {0}")]
    Transport(String),

    #[error("Сервис агрегации вернул ошибку: {0}")]
    Application(String),
}

/// Normalized answer for one level
#[derive(Debug, Clone, PartialEq)]
pub enum LevelOutcome {
    Groups(Vec<PanelItem>),
    LeafLines(Vec<LeafRecord>),
    /// Valid request, zero rows
    Empty,
    Failed(DrilldownError),
}

pub async fn resolve(ticket: &FetchTicket) -> LevelOutcome {
    let result = match &ticket.request {
        FetchRequest::Root(request) => api::fetch_root(request).await,
        FetchRequest::Level(request) => api::fetch_level(request).await,
    };
    normalize(ticket.level, result)
}

/// `Err` is a transport failure reported by the HTTP layer.
pub fn normalize(level: LevelId, result: Result<DrilldownResponse, String>) -> LevelOutcome {
    match result {
        Err(message) => LevelOutcome::Failed(DrilldownError::Transport(message)),
        Ok(DrilldownResponse::Empty) => LevelOutcome::Empty,
        Ok(DrilldownResponse::Error { kind, message }) => LevelOutcome::Failed(match kind {
            ErrorKind::Transport => DrilldownError::Transport(message),
            ErrorKind::Application => DrilldownError::Application(message),
        }),
        Ok(DrilldownResponse::Ok { rows }) => split_rows(level, rows),
    }
}

fn split_rows(level: LevelId, rows: Vec<DrilldownRow>) -> LevelOutcome {
    if rows.is_empty() {
        return LevelOutcome::Empty;
    }

    if level.is_leaf() {
        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                DrilldownRow::LeafLine(line) => lines.push(line),
                DrilldownRow::Group(item) => return mismatch(level, &item.key),
            }
        }
        LevelOutcome::LeafLines(lines)
    } else {
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                DrilldownRow::Group(item) => items.push(item),
                DrilldownRow::LeafLine(line) => return mismatch(level, &line.key),
            }
        }
        LevelOutcome::Groups(items)
    }
}

fn mismatch(level: LevelId, key: &str) -> LevelOutcome {
    LevelOutcome::Failed(DrilldownError::Application(format!(
        "строка '{}' не соответствует уровню «{}»",
        key,
        level.title()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(key: &str) -> DrilldownRow {
        DrilldownRow::Group(PanelItem {
            key: key.into(),
            name: key.into(),
            value: 1.0,
        })
    }

    fn line(key: &str) -> DrilldownRow {
        DrilldownRow::LeafLine(LeafRecord {
            key: key.into(),
            name: key.into(),
            value: 1.0,
            quantity: 1.0,
            unit_price: 1.0,
            avg_unit_price: 1.0,
            payment_condition: None,
        })
    }

    #[test]
    fn test_group_rows() {
        let outcome = normalize(
            LevelId::Clients,
            Ok(DrilldownResponse::Ok {
                rows: vec![group("c1"), group("c2")],
            }),
        );
        match outcome {
            LevelOutcome::Groups(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_leaf_rows() {
        let outcome = normalize(
            LevelId::Products,
            Ok(DrilldownResponse::Ok {
                rows: vec![line("l1"), line("l2"), line("l3")],
            }),
        );
        assert!(matches!(outcome, LevelOutcome::LeafLines(ref l) if l.len() == 3));
    }

    #[test]
    fn test_row_kind_mismatch_is_application_error() {
        let outcome = normalize(
            LevelId::Orders,
            Ok(DrilldownResponse::Ok {
                rows: vec![group("o1"), line("l1")],
            }),
        );
        assert!(matches!(
            outcome,
            LevelOutcome::Failed(DrilldownError::Application(_))
        ));

        let outcome = normalize(
            LevelId::Products,
            Ok(DrilldownResponse::Ok {
                rows: vec![group("o1")],
            }),
        );
        assert!(matches!(
            outcome,
            LevelOutcome::Failed(DrilldownError::Application(_))
        ));
    }

    #[test]
    fn test_error_taxonomy() {
        assert_eq!(
            normalize(LevelId::Groups, Err("HTTP error: 502".into())),
            LevelOutcome::Failed(DrilldownError::Transport("HTTP error: 502".into()))
        );
        assert_eq!(
            normalize(
                LevelId::Groups,
                Ok(DrilldownResponse::transport_error("timeout"))
            ),
            LevelOutcome::Failed(DrilldownError::Transport("timeout".into()))
        );
        assert_eq!(
            normalize(
                LevelId::Groups,
                Ok(DrilldownResponse::application_error("bad member"))
            ),
            LevelOutcome::Failed(DrilldownError::Application("bad member".into()))
        );
        assert_eq!(
            normalize(LevelId::Dates, Ok(DrilldownResponse::Empty)),
            LevelOutcome::Empty
        );
        assert_eq!(
            normalize(LevelId::Dates, Ok(DrilldownResponse::Ok { rows: vec![] })),
            LevelOutcome::Empty
        );
    }
}
