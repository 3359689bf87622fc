//! Mrt Bootstrap - entry points for generated call sites.
//!
//! Generated code never touches carriers, pattern handles or dispatch tables
//! directly. Each call site names the artifact it needs together with the
//! invocation type it was compiled against, and gets back a [`CallSite`]
//! whose target handle has exactly that type. A disagreement between the
//! invocation type and the request fails with `ContractMismatch` when the
//! site is bootstrapped, never when it runs.
//!
//! # Entry Points
//!
//! - carriers: [`carrier`], [`carrier_component`]
//! - patterns: the `of_*` factories and combinators, plus
//!   [`match_attempt_of`] and [`component_of`]
//! - switches: [`int_switch`], [`float_switch`], [`string_switch`],
//!   [`enum_switch`], [`enum_type_switch`], [`type_switch`]

mod carrier;
mod patterns;
mod switches;

use std::sync::Once;

use mrt_ir::{Handle, HandleResult, RuntimeError, RuntimeResult, Signature, Value};

pub use carrier::{carrier, carrier_component};
pub use patterns::{component_of, match_attempt_of};
pub use switches::{
    enum_switch, enum_type_switch, float_switch, int_switch, string_switch,
    string_switch_with_hasher, type_switch,
};

pub use mrt_patterns::{
    adapt_target, compose, drop_bindings, nested, of_constant, of_constant_for,
    of_eager_projection, of_imperative, of_lazy_projection, of_record, of_type, of_type_for,
    of_type_nullable, of_type_nullable_for, Bind, Bindings, Descriptor, Digester, PatternHandle,
};
pub use mrt_switch::{TypeLabel, NULL_INDEX};

/// A bootstrapped call site: the handle generated code invokes.
#[derive(Clone, Debug)]
pub struct CallSite {
    target: Handle,
}

impl CallSite {
    /// A site running `target`, which must have exactly the invocation type.
    fn checked(invocation: &Signature, target: Handle) -> RuntimeResult<Self> {
        if target.signature() != invocation {
            return Err(RuntimeError::contract_mismatch(
                invocation,
                target.signature().to_string(),
            ));
        }
        Ok(CallSite { target })
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        self.target.signature()
    }

    #[inline]
    pub fn target(&self) -> &Handle {
        &self.target
    }

    pub fn invoke(&self, args: &[Value]) -> HandleResult {
        self.target.invoke(args)
    }

    pub fn into_target(self) -> Handle {
        self.target
    }
}

static TRACING_INIT: Once = Once::new();

/// Crates whose events `MRT_LOG` enables.
const RUNTIME_TARGETS: [&str; 5] =
    ["mrt_ir", "mrt_carrier", "mrt_patterns", "mrt_switch", "mrt_bootstrap"];

/// Filter directives from the environment.
///
/// `MRT_LOG=<level>` enables the runtime crates at that level and nothing
/// else; otherwise `RUST_LOG` is used as is. `None` when neither is set.
fn filter_directives(mrt_log: Option<&str>, rust_log: Option<&str>) -> Option<String> {
    match (mrt_log, rust_log) {
        (Some(level), _) => Some(
            RUNTIME_TARGETS
                .iter()
                .map(|target| format!("{target}={}", level.trim()))
                .collect::<Vec<_>>()
                .join(","),
        ),
        (None, directives) => directives.map(str::to_owned),
    }
}

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `MRT_LOG=debug`, or with full
/// directives such as `RUST_LOG=mrt_switch=debug,mrt_carrier=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let mrt_log = std::env::var("MRT_LOG").ok();
        let rust_log = std::env::var("RUST_LOG").ok();
        let Some(directives) = filter_directives(mrt_log.as_deref(), rust_log.as_deref()) else {
            return;
        };
        // Another subscriber may already be installed by the embedding program.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::new(directives))
            .try_init();
    });
}
