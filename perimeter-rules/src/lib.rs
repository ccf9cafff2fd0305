mod error;
mod model;
mod naming;
mod service;

pub use error::{BatchError, RuleError, RuleFailure};
pub use model::{Scope, ScopedRule, ScopedRuleSet};
pub use naming::{custom_name, filter_by_scope, provider_name, scope_prefix};
pub use service::RuleService;
