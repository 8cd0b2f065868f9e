/// Capability flags gating when and how a plugin can be resolved.
/// Hand-rolled as plain bools rather than pulling in `bitflags` for a
/// three-bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PluginFlags {
    /// `resolve_input` requires the active user.
    pub needs_userdata: bool,
    /// The value originates from an HTTP response.
    pub needs_response: bool,
    /// Value derives from other plugin values at resolution time.
    pub depends_on_other_plugins: bool,
}

impl PluginFlags {
    pub const NONE: PluginFlags = PluginFlags {
        needs_userdata: false,
        needs_response: false,
        depends_on_other_plugins: false,
    };

    pub const fn needs_userdata() -> Self {
        Self {
            needs_userdata: true,
            ..Self::NONE
        }
    }

    pub const fn needs_response() -> Self {
        Self {
            needs_response: true,
            ..Self::NONE
        }
    }

    pub const fn depends_on_other_plugins() -> Self {
        Self {
            depends_on_other_plugins: true,
            ..Self::NONE
        }
    }

    /// True for any plugin kind that can be used as a flow output: a
    /// valid output binding must have this set.
    pub fn is_response_extractable(&self) -> bool {
        self.needs_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_has_no_flags_set() {
        let flags = PluginFlags::NONE;
        assert!(!flags.needs_userdata);
        assert!(!flags.needs_response);
        assert!(!flags.depends_on_other_plugins);
    }

    #[test]
    fn response_extractable_tracks_needs_response() {
        assert!(PluginFlags::needs_response().is_response_extractable());
        assert!(!PluginFlags::needs_userdata().is_response_extractable());
    }
}
