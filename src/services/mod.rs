// IR Hub services
// Cross-cutting concerns: authorization rules, settings, logging.

pub mod access_policy;
pub mod logging;
pub mod settings_engine;
