use anyhow::Result;
use futures::{StreamExt, TryStreamExt, stream};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{record::ResourceRecord, repository::ResourceRepository};

/// Order value for a new record: one past the current maximum of its
/// partition, or 1 for an empty partition.
///
/// Two concurrent creators can observe the same maximum and receive the same
/// value. Reorder requests repair such duplicates.
pub async fn allocate_next_order(
    repo: &dyn ResourceRepository,
    category: Option<&str>,
) -> Result<i32> {
    let current = repo.max_display_order(category).await?;
    Ok(current.map_or(1, |max| max + 1))
}

/// Closes the gap left by `deleted` by moving every later sibling up by one.
pub async fn renumber_after_delete(
    repo: &dyn ResourceRepository,
    deleted: &ResourceRecord,
) -> Result<u64> {
    let shifted = repo
        .close_gap(deleted.category.as_deref(), deleted.display_order)
        .await?;
    debug!(shifted, table = repo.kind().table, "closed display order gap");
    Ok(shifted)
}

/// Reorder entry exactly as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub display_order: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderAssignment {
    pub id: Uuid,
    pub display_order: i32,
}

/// Checks every submitted entry. All problems are reported together, one
/// message per offending entry and attribute.
pub fn validate_reorder(
    items: &[ReorderItem],
    min_display_order: i32,
) -> Result<Vec<ReorderAssignment>, Vec<String>> {
    let mut errors = Vec::new();
    let mut assignments = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let position = index + 1;
        let id = item.id.as_str().and_then(|raw| Uuid::parse_str(raw).ok());
        if id.is_none() {
            errors.push(format!("Item {position}: Invalid ID"));
        }

        let display_order = item
            .display_order
            .as_i64()
            .and_then(|value| i32::try_from(value).ok())
            .filter(|value| *value >= min_display_order);
        if display_order.is_none() {
            errors.push(format!("Item {position}: Invalid display order"));
        }

        if let (Some(id), Some(display_order)) = (id, display_order) {
            assignments.push(ReorderAssignment { id, display_order });
        }
    }

    if errors.is_empty() {
        Ok(assignments)
    } else {
        Err(errors)
    }
}

/// Applies each assignment independently with at most `concurrency` updates
/// in flight. Ids that match no row are skipped. The first failing update is
/// returned; updates already applied stay applied.
pub async fn apply_reorder(
    repo: &dyn ResourceRepository,
    assignments: &[ReorderAssignment],
    concurrency: usize,
) -> Result<usize> {
    let results: Vec<bool> = stream::iter(assignments.iter().copied())
        .map(|assignment| repo.set_display_order(assignment.id, assignment.display_order))
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(results.into_iter().filter(|updated| *updated).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: Value, display_order: Value) -> ReorderItem {
        ReorderItem { id, display_order }
    }

    #[test]
    fn valid_batch_becomes_assignments() {
        let id = Uuid::new_v4();
        let assignments =
            validate_reorder(&[item(json!(id.to_string()), json!(0))], 0).expect("valid batch");
        assert_eq!(
            assignments,
            vec![ReorderAssignment {
                id,
                display_order: 0
            }]
        );
    }

    #[test]
    fn every_problem_is_reported_with_its_position() {
        let errors = validate_reorder(
            &[
                item(json!(Uuid::new_v4().to_string()), json!(2)),
                item(json!("not-an-id"), json!(0)),
                item(json!(42), json!("3")),
            ],
            1,
        )
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "Item 2: Invalid ID",
                "Item 2: Invalid display order",
                "Item 3: Invalid ID",
                "Item 3: Invalid display order",
            ]
        );
    }

    #[test]
    fn fractional_orders_are_rejected() {
        let errors =
            validate_reorder(&[item(json!(Uuid::new_v4().to_string()), json!(1.5))], 0).unwrap_err();
        assert_eq!(errors, vec!["Item 1: Invalid display order"]);
    }
}
