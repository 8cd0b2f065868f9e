use raider_core::http_client::HttpResponseSpec;
use raider_core::session::Session;
use raider_plugin::registry::CustomPluginRegistry;
use raider_plugin::Plugin;
use std::sync::Arc;
use tracing::warn;

/// After a request completes, walk the flow's declared output plugins and
/// fill their values from the response (cookies, headers, body). A plugin
/// that fails to extract logs a warning and leaves the session's stored
/// value (or absence) untouched: a failed re-extraction must not clobber
/// a previously bound value.
pub fn bind_outputs(
    response: &HttpResponseSpec,
    outputs: &[Arc<Plugin>],
    session: &mut Session,
    registry: &CustomPluginRegistry,
) {
    for plugin in outputs {
        match plugin.extract_output(response, registry) {
            Some(value) => session.set_value(plugin.name.clone(), Some(value)),
            None => warn!(plugin = %plugin.name, "Couldn't extract output: {}", plugin.name),
        }
    }
}
