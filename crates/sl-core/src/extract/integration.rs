use crate::types::event::SYSTEM_SOURCE;

/// Integrations a record can be attributed to.
pub const KNOWN_INTEGRATIONS: &[&str] = &["rezen", "fub", "skyslope", "dotloop", "brokermint", "lofty"];

/// Attributes a record to the first known integration whose name appears in
/// `hint`, falling back to `system`.
pub fn infer_source(hint: Option<&str>) -> String {
    let Some(hint) = hint else {
        return SYSTEM_SOURCE.to_string();
    };
    let hint = hint.to_ascii_lowercase();
    KNOWN_INTEGRATIONS
        .iter()
        .find(|name| hint.contains(*name))
        .map_or_else(|| SYSTEM_SOURCE.to_string(), |name| (*name).to_string())
}
