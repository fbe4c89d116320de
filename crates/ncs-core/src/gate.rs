//! Capture eligibility.
//!
//! Rules are checked in order and the first one that applies decides:
//!
//! 1. capture disabled in the policy: never
//! 2. fatal errors: always
//! 3. always-captured checked errors: always
//! 4. the category's own flag, if the category has one
//! 5. the kind's flag (unchecked → runtime, I/O → io)
//! 6. origin in the host mod loader or the host platform, by type name or
//!    any stack frame: that origin's flag
//! 7. otherwise: eligible

use serde::Serialize;
use std::sync::Arc;

use ncs_common::{Category, ErrorKind, ThrownError};
use ncs_config::ExceptionPolicy;

use crate::signature::{PackageOrigin, SignatureTable};

/// Which rule decided a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "detail", rename_all = "snake_case")]
pub enum GateReason {
    CaptureDisabled,
    Fatal,
    AlwaysCaptured,
    CategoryFlag(Category),
    KindFlag(ErrorKind),
    Origin(PackageOrigin),
    Default,
}

/// Result of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateDecision {
    pub eligible: bool,
    pub reason: GateReason,
}

impl GateDecision {
    fn new(eligible: bool, reason: GateReason) -> Self {
        Self { eligible, reason }
    }
}

/// Decides whether a classified error should be written.
#[derive(Debug, Clone)]
pub struct CaptureGate {
    table: Arc<SignatureTable>,
}

impl Default for CaptureGate {
    fn default() -> Self {
        Self::new(SignatureTable::builtin())
    }
}

impl CaptureGate {
    pub fn new(table: Arc<SignatureTable>) -> Self {
        Self { table }
    }

    pub fn eligible(&self, error: &ThrownError, category: Category, policy: &ExceptionPolicy) -> bool {
        self.decide(error, category, policy).eligible
    }

    pub fn decide(
        &self,
        error: &ThrownError,
        category: Category,
        policy: &ExceptionPolicy,
    ) -> GateDecision {
        if !policy.capture_enabled {
            return GateDecision::new(false, GateReason::CaptureDisabled);
        }
        if error.kind == ErrorKind::Fatal {
            return GateDecision::new(true, GateReason::Fatal);
        }
        if self.table.is_always_captured(error.simple_name()) {
            return GateDecision::new(true, GateReason::AlwaysCaptured);
        }

        let flags = &policy.flags;
        if let Some(flag) = flags.for_category(category) {
            return GateDecision::new(flag, GateReason::CategoryFlag(category));
        }
        match error.kind {
            ErrorKind::Unchecked => {
                return GateDecision::new(flags.runtime, GateReason::KindFlag(error.kind))
            }
            ErrorKind::Io => return GateDecision::new(flags.io, GateReason::KindFlag(error.kind)),
            _ => {}
        }

        match self.host_origin(error) {
            Some(PackageOrigin::HostFramework) => GateDecision::new(
                flags.host_framework,
                GateReason::Origin(PackageOrigin::HostFramework),
            ),
            Some(PackageOrigin::HostPlatform) => GateDecision::new(
                flags.host_platform,
                GateReason::Origin(PackageOrigin::HostPlatform),
            ),
            _ => GateDecision::new(true, GateReason::Default),
        }
    }

    /// Host origin of the error: the mod loader if its packages appear
    /// anywhere, else the platform if its packages appear anywhere.
    fn host_origin(&self, error: &ThrownError) -> Option<PackageOrigin> {
        let owners = std::iter::once(error.type_name.as_str())
            .chain(error.frames.iter().map(|f| f.owning_type.as_str()));
        let mut platform = false;
        for owner in owners {
            match self.table.known_origin(owner) {
                Some(PackageOrigin::HostFramework) => return Some(PackageOrigin::HostFramework),
                Some(PackageOrigin::HostPlatform) => platform = true,
                _ => {}
            }
        }
        platform.then_some(PackageOrigin::HostPlatform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncs_common::Frame;
    use ncs_config::CategoryFlags;

    use crate::classify::Classifier;

    fn policy(flags: CategoryFlags) -> ExceptionPolicy {
        ExceptionPolicy {
            flags,
            ..ExceptionPolicy::default()
        }
    }

    fn decide(error: &ThrownError, policy: &ExceptionPolicy) -> GateDecision {
        let (category, _) = Classifier::default().category_of(error);
        CaptureGate::default().decide(error, category, policy)
    }

    #[test]
    fn test_disabled_policy_rejects_everything() {
        let err = ThrownError::new("java.lang.OutOfMemoryError", ErrorKind::Fatal);
        let d = decide(&err, &ExceptionPolicy::disabled());
        assert!(!d.eligible);
        assert_eq!(d.reason, GateReason::CaptureDisabled);
    }

    #[test]
    fn test_fatal_is_always_captured() {
        let err = ThrownError::new("java.lang.StackOverflowError", ErrorKind::Fatal);
        let d = decide(&err, &policy(CategoryFlags::all(false)));
        assert!(d.eligible);
        assert_eq!(d.reason, GateReason::Fatal);
    }

    #[test]
    fn test_always_captured_checked_errors() {
        let err = ThrownError::new("java.lang.CloneNotSupportedException", ErrorKind::Checked);
        let d = decide(&err, &policy(CategoryFlags::all(false)));
        assert!(d.eligible);
        assert_eq!(d.reason, GateReason::AlwaysCaptured);

        let err = ThrownError::new("java.lang.InterruptedException", ErrorKind::Checked);
        assert!(decide(&err, &policy(CategoryFlags::all(false))).eligible);
    }

    #[test]
    fn test_reflective_errors_ignore_flags() {
        for name in [
            "java.lang.ReflectiveOperationException",
            "java.lang.ClassNotFoundException",
            "java.lang.NoSuchMethodException",
            "java.lang.NoSuchFieldException",
            "java.lang.IllegalAccessException",
            "java.lang.InstantiationException",
            "java.lang.reflect.InvocationTargetException",
        ] {
            let err = ThrownError::new(name, ErrorKind::Checked);
            let d = decide(&err, &policy(CategoryFlags::all(false)));
            assert!(d.eligible, "{} should be captured", name);
            assert_eq!(d.reason, GateReason::AlwaysCaptured);
        }
    }

    #[test]
    fn test_io_flag_off_rejects_io() {
        let flags = CategoryFlags {
            io: false,
            ..CategoryFlags::default()
        };
        let err = ThrownError::new("java.io.IOException", ErrorKind::Io);
        let d = decide(&err, &policy(flags));
        assert!(!d.eligible);
        assert_eq!(d.reason, GateReason::CategoryFlag(Category::Io));
    }

    #[test]
    fn test_runtime_flag_by_kind() {
        let flags = CategoryFlags {
            runtime: false,
            ..CategoryFlags::default()
        };
        let err = ThrownError::new("java.lang.IllegalStateException", ErrorKind::Unchecked);
        assert!(!decide(&err, &policy(flags)).eligible);
    }

    #[test]
    fn test_signature_flag_beats_kind() {
        let flags = CategoryFlags {
            runtime: false,
            ..CategoryFlags::default()
        };
        // unchecked, but classified as Concurrent
        let err = ThrownError::new(
            "java.util.ConcurrentModificationException",
            ErrorKind::Unchecked,
        );
        let d = decide(&err, &policy(flags));
        assert!(d.eligible);
        assert_eq!(d.reason, GateReason::CategoryFlag(Category::Concurrent));
    }

    #[test]
    fn test_graphics_has_no_flag_and_falls_to_kind() {
        let flags = CategoryFlags {
            runtime: false,
            ..CategoryFlags::default()
        };
        let err = ThrownError::new("com.example.ShaderCompileException", ErrorKind::Unchecked);
        let d = decide(&err, &policy(flags));
        assert!(!d.eligible);
        assert_eq!(d.reason, GateReason::KindFlag(ErrorKind::Unchecked));
    }

    #[test]
    fn test_framework_origin_flag() {
        let flags = CategoryFlags {
            host_framework: false,
            ..CategoryFlags::default()
        };
        let err = ThrownError::new("com.example.ModLoadFailure", ErrorKind::Checked)
            .with_frame(Frame::new("net.minecraft.server.Main"))
            .with_frame(Frame::new("net.fabricmc.loader.impl.Entrypoint"));
        let d = decide(&err, &policy(flags));
        assert!(!d.eligible);
        assert_eq!(d.reason, GateReason::Origin(PackageOrigin::HostFramework));
    }

    #[test]
    fn test_platform_origin_flag() {
        let flags = CategoryFlags {
            host_platform: false,
            ..CategoryFlags::default()
        };
        let err = ThrownError::new("net.minecraft.util.crash.CrashException", ErrorKind::Checked);
        let d = decide(&err, &policy(flags));
        assert!(!d.eligible);
        assert_eq!(d.reason, GateReason::Origin(PackageOrigin::HostPlatform));
    }

    #[test]
    fn test_unattributed_checked_error_defaults_to_eligible() {
        let err = ThrownError::new("com.example.mymod.ConfigProblem", ErrorKind::Checked)
            .with_frame(Frame::new("com.example.mymod.Config"));
        let d = decide(&err, &policy(CategoryFlags::all(false)));
        assert!(d.eligible);
        assert_eq!(d.reason, GateReason::Default);
    }

    #[test]
    fn test_eligible_matches_decide() {
        let err = ThrownError::new("java.io.IOException", ErrorKind::Io);
        let p = ExceptionPolicy::default();
        assert!(CaptureGate::default().eligible(&err, Category::Io, &p));
    }
}
