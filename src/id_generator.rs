use std::sync::atomic::{AtomicU64, Ordering};

// Single static counter for listener ids and dispatcher handles
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

pub fn generate_id() -> u64 {
    NEXT_TOKEN.fetch_add(1, Ordering::SeqCst)
}
