use crate::client::LookupService;
use astrace_model::HopRecord;
use tracing::{debug, warn};

pub fn enrich<L: LookupService + ?Sized>(service: &L, sequence: u32, address: &str) -> HopRecord {
    match service.lookup(address) {
        Ok(response) => {
            debug!(sequence, address, org = ?response.org, "hop enriched");
            HopRecord::from_response(sequence, &response)
        }
        Err(err) => {
            warn!(sequence, address, error = %err, "lookup failed, hop left unenriched");
            HopRecord::degraded(sequence, address)
        }
    }
}
