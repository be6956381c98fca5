// ============================================================================
// UPSTREAM SERVICES
// ============================================================================
pub mod facturama_client;

pub use facturama_client::{FacturamaClient, InvoicingClient};
