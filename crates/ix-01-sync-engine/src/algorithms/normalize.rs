//! # Transaction Normalization
//!
//! Map a node's transaction record onto the stored row.

use crate::domain::{Transaction, TxStatus};
use crate::ports::RemoteTransaction;

/// Settlement ids as stored: the remote list when non-empty, otherwise an
/// explicit empty list.
pub fn normalize_settlement_ids(remote: Option<Vec<String>>) -> Vec<String> {
    match remote {
        Some(ids) if !ids.is_empty() => ids,
        _ => Vec::new(),
    }
}

/// Build the stored transaction for `id` in block `block_height`.
pub fn normalize_transaction(
    id: &str,
    block_height: u64,
    remote: RemoteTransaction,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        block_height,
        status: TxStatus::from_remote(&remote.status),
        settlement_ids: normalize_settlement_ids(remote.settlement_ids),
        payload: remote.payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: &str, settlement_ids: Option<Vec<String>>) -> RemoteTransaction {
        RemoteTransaction {
            payload: serde_json::json!({ "kind": "transfer" }),
            status: status.to_string(),
            settlement_ids,
        }
    }

    #[test]
    fn test_missing_settlement_ids_become_empty() {
        assert!(normalize_settlement_ids(None).is_empty());
        assert!(normalize_settlement_ids(Some(vec![])).is_empty());
    }

    #[test]
    fn test_settlement_ids_kept_in_order() {
        let ids = vec!["b".to_string(), "a".to_string()];
        assert_eq!(normalize_settlement_ids(Some(ids.clone())), ids);
    }

    #[test]
    fn test_normalize_processing_transaction() {
        let tx = normalize_transaction("tx-1", 9, remote("processing", None));
        assert_eq!(tx.id, "tx-1");
        assert_eq!(tx.block_height, 9);
        assert_eq!(tx.status, TxStatus::Pending);
        assert!(tx.settlement_ids.is_empty());
        assert_eq!(tx.payload["kind"], "transfer");
    }

    #[test]
    fn test_normalize_settled_transaction() {
        let tx = normalize_transaction(
            "tx-2",
            9,
            remote("success", Some(vec!["settle-1".to_string()])),
        );
        assert_eq!(tx.status, TxStatus::Finalized);
        assert_eq!(tx.settlement_ids, vec!["settle-1"]);
    }
}
