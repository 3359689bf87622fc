//! Lazily linked call sites.
//!
//! A call site starts on a generic strategy and, on its first invocation,
//! asks its linker for a better one. The linker may look at the arguments of
//! that first call. The linked handle is published through a `OnceLock` and
//! used by every later invocation.
//!
//! # Thread Safety
//!
//! The linker runs outside the cell, so racing first invocations may each
//! compute a candidate, but only one is published and every caller after
//! that (the losers included) uses it. No caller sees a partially linked
//! site.

use std::fmt;
use std::sync::{Arc, OnceLock};

use mrt_ir::{Handle, HandleResult, RuntimeConfig, RtType, Signature, Value};
use tracing::{debug, warn};

use crate::table::SwitchTable;

/// Computes the linked handle from the first invocation's arguments.
pub type Linker = Arc<dyn Fn(&[Value]) -> Handle + Send + Sync>;

/// A call site that relinks itself once, on first use.
pub struct LazyCallSite {
    generic: Handle,
    linker: Linker,
    linked: OnceLock<Handle>,
    relink: bool,
}

impl LazyCallSite {
    /// A site on `generic` that links through `linker`.
    ///
    /// Relinking follows `RuntimeConfig::global().relink_call_sites`.
    pub fn new(generic: Handle, linker: Linker) -> Self {
        LazyCallSite {
            generic,
            linker,
            linked: OnceLock::new(),
            relink: RuntimeConfig::global().relink_call_sites,
        }
    }

    /// Override whether this site may relink.
    #[must_use]
    pub fn with_relink(mut self, relink: bool) -> Self {
        self.relink = relink;
        self
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        self.generic.signature()
    }

    /// Whether the site has linked.
    pub fn is_linked(&self) -> bool {
        self.linked.get().is_some()
    }

    /// The handle the next invocation runs, without linking.
    pub fn current(&self) -> &Handle {
        self.linked.get().unwrap_or(&self.generic)
    }

    pub fn invoke(&self, args: &[Value]) -> HandleResult {
        if !self.relink {
            return self.generic.invoke(args);
        }
        match self.linked.get() {
            Some(linked) => linked.invoke(args),
            None => self.link(args).invoke(args),
        }
    }

    fn link(&self, args: &[Value]) -> &Handle {
        let mut candidate = (self.linker)(args);
        if candidate.signature() != self.generic.signature() {
            warn!(
                site = %self.generic.signature(),
                linked = %candidate.signature(),
                "linker changed the call site type, keeping the generic strategy"
            );
            candidate = self.generic.clone();
        }
        self.linked.get_or_init(|| {
            debug!(site = %candidate.signature(), "linked call site");
            candidate
        })
    }

    /// The site as a handle of its own signature.
    pub fn into_handle(self) -> Handle {
        let sig = self.signature().clone();
        let site = Arc::new(self);
        Handle::new(sig, move |args| site.invoke(args))
    }
}

impl fmt::Debug for LazyCallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCallSite")
            .field("signature", self.signature())
            .field("linked", &self.is_linked())
            .field("relink", &self.relink)
            .finish_non_exhaustive()
    }
}

/// A `(param) -> int` site over `table`: linear scan until first use, then
/// the indexed lookup.
pub fn table_site<T: SwitchTable>(table: T, param: RtType) -> LazyCallSite {
    let table = Arc::new(table);
    let generic = {
        let table = Arc::clone(&table);
        Handle::unary(param, RtType::INT, move |target| Ok(Value::Int(table.scan(target))))
    };
    let linker: Linker = Arc::new(move |_: &[Value]| {
        let table = Arc::clone(&table);
        Handle::unary(param, RtType::INT, move |target| Ok(Value::Int(table.dispatch(target))))
    });
    LazyCallSite::new(generic, linker)
}
