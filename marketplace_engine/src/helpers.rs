use rand::Rng;

use crate::db_types::OrderId;

/// Generates a fresh opaque public order id.
pub fn new_order_id() -> OrderId {
    let id: u64 = rand::thread_rng().gen();
    OrderId(format!("smp-{id:016x}"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_ids_are_unique_enough() {
        let a = new_order_id();
        let b = new_order_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("smp-"));
    }
}
