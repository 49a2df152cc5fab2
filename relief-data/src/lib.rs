//! CSV import of receipts and yearly income into any relief repository.

mod loader;

pub use loader::{
    IncomeLoader, IncomeLoaderError, IncomeRecord, ReceiptLoader, ReceiptLoaderError,
    ReceiptRecord,
};
