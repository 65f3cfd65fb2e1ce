//! Pure points / ranking core. No IO here; persistence lives in `db`.

pub mod rank;
pub mod reconcile;
pub mod rules;
pub mod types;

use once_cell::sync::Lazy;
use tokio::sync::Mutex;

// Reconciliation is a read-modify-write over the whole member set; two
// interleaved calls can lose point updates or diff against a stale snapshot.
// Every mutating handler holds this lock for the duration of the call.
static LEDGER_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn ledger_lock() -> &'static Mutex<()> {
    &LEDGER_LOCK
}
