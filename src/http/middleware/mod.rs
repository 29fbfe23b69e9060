pub mod tenant_context;

pub use tenant_context::{tenant_context_middleware, ResolvedBy, TenantContext};
