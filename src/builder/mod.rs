//! Payload builders: option record in, API payload out.
//!
//! Builders do no I/O apart from reading a local file named by an option.
//! Empty options are left out of the payload rather than sent as zero values.

mod break_glass;
mod external_auth;
mod tuning;

pub use break_glass::{build_break_glass, build_break_glass_at};
pub use external_auth::{args_from_external_auth, build_external_auth};
pub use tuning::build_tuning_config;

use crate::model::{ClusterArchitecture, DnsDomain};

/// DNS domain request for a classic or hosted-control-plane cluster.
pub fn build_dns_domain(is_hosted_cp: bool) -> DnsDomain {
    DnsDomain {
        id: String::new(),
        cluster_arch: if is_hosted_cp {
            ClusterArchitecture::Hcp
        } else {
            ClusterArchitecture::Classic
        },
        user_defined: false,
        cluster: None,
    }
}
