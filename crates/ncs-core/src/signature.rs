//! Signature tables used for classification and capture gating.
//!
//! A [`SignatureTable`] is built once per process and shared by reference.
//! It holds two ordered lists:
//!
//! - Category signatures: regexes over an error's type name. The first one
//!   that matches decides the category.
//! - Package signatures: dotted prefixes of frame owner types, identifying
//!   the host platform, the host mod loader and well-known libraries.
//!
//! When no known prefix matches a frame, a generic heuristic accepts any
//! owner with at least three lowercase package segments, except for the
//! language runtime and the logging framework itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ncs_common::Category;

/// Who a package prefix belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageOrigin {
    /// The host platform (game) itself.
    HostPlatform,
    /// The host mod loader.
    HostFramework,
    /// A known third-party or compatibility library.
    Library,
    /// Matched only by the three-segment heuristic.
    Generic,
}

/// A category keyed on type names.
#[derive(Debug, Clone)]
pub struct CategorySignature {
    pub category: Category,
    pattern: Regex,
}

impl CategorySignature {
    pub fn new(category: Category, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            pattern: Regex::new(pattern)?,
        })
    }

    /// Whether the simple or the qualified name matches.
    pub fn matches(&self, simple_name: &str, qualified_name: &str) -> bool {
        self.pattern.is_match(simple_name) || self.pattern.is_match(qualified_name)
    }
}

/// A dotted package prefix with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSignature {
    pub origin: PackageOrigin,
    pub prefix: String,
}

impl PackageSignature {
    pub fn new(origin: PackageOrigin, prefix: impl Into<String>) -> Self {
        Self {
            origin,
            prefix: prefix.into(),
        }
    }
}

/// Ordered category and package signatures.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    categories: Vec<CategorySignature>,
    packages: Vec<PackageSignature>,
    generic: Regex,
    generic_excluded: Vec<String>,
    always_captured: Vec<String>,
}

static CATEGORY_PATTERNS: &[(Category, &str)] = &[
    (Category::Runtime, r"RuntimeException$"),
    (Category::Io, r"IOException$"),
    (
        Category::Concurrent,
        r"^(?:ConcurrentModificationException|InterruptedException)$",
    ),
    (
        Category::Reflection,
        r"^(?:ReflectiveOperationException|ClassNotFoundException|NoSuchMethodException|NoSuchFieldException|IllegalAccessException|InstantiationException|InvocationTargetException)$",
    ),
    (Category::Security, r"(?:Security|AccessControl)Exception$"),
    (
        Category::Network,
        r"(?:Socket[A-Za-z]*|Connect[A-Za-z]*|UnknownHost|NoRouteToHost|PortUnreachable|Bind|Http[A-Za-z]*)Exception$",
    ),
    (Category::Parse, r"(?:Parse|NumberFormat)Exception$"),
    (
        Category::Data,
        r"(?:Json[A-Za-z]*|Gson[A-Za-z]*|Nbt[A-Za-z]*|Codec[A-Za-z]*|Malformed[A-Za-z]*|DataFormat|Serialization)Exception$",
    ),
    (Category::Platform, r"CommandSyntaxException$"),
    (
        Category::Graphics,
        r"(?:Render|Texture|Shader|OpenGl|OpenGL)[A-Za-z]*(?:Exception|Error)$",
    ),
    (Category::Memory, r"^OutOfMemoryError$"),
];

static PACKAGE_PREFIXES: &[(PackageOrigin, &str)] = &[
    (PackageOrigin::HostPlatform, "net.minecraft."),
    (PackageOrigin::HostPlatform, "com.mojang."),
    (PackageOrigin::HostFramework, "net.fabricmc."),
    (PackageOrigin::Library, "org.spongepowered.asm."),
    (PackageOrigin::Library, "me.jellysquid.mods."),
    (PackageOrigin::Library, "net.caffeinemc."),
    (PackageOrigin::Library, "org.quiltmc."),
    (PackageOrigin::Library, "dev.architectury."),
    (PackageOrigin::Library, "me.shedaniel."),
    (PackageOrigin::Library, "com.terraformersmc."),
    (PackageOrigin::Library, "mezz.jei."),
    (PackageOrigin::Library, "software.bernie."),
];

/// Owner prefixes never attributed by the generic heuristic.
static GENERIC_EXCLUDED: &[&str] = &[
    "java.",
    "javax.",
    "jdk.",
    "sun.",
    "com.sun.",
    "kotlin.",
    "scala.",
    "org.apache.logging.",
    "org.slf4j.",
];

/// Checked errors that are captured whatever the flags say.
static ALWAYS_CAPTURED: &[&str] = &[
    "ReflectiveOperationException",
    "ClassNotFoundException",
    "NoSuchMethodException",
    "NoSuchFieldException",
    "IllegalAccessException",
    "InstantiationException",
    "InvocationTargetException",
    "CloneNotSupportedException",
    "InterruptedException",
];

static BUILTIN: Lazy<Arc<SignatureTable>> = Lazy::new(|| {
    let categories = CATEGORY_PATTERNS
        .iter()
        .map(|(category, pattern)| CategorySignature::new(*category, pattern).unwrap())
        .collect();
    let packages = PACKAGE_PREFIXES
        .iter()
        .map(|(origin, prefix)| PackageSignature::new(*origin, *prefix))
        .collect();
    Arc::new(SignatureTable {
        categories,
        packages,
        generic: Regex::new(r"^[a-z][a-z0-9_]*(?:\.[a-z][a-z0-9_]*){2,}\.[A-Za-z_$][A-Za-z0-9_$]*$")
            .unwrap(),
        generic_excluded: GENERIC_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        always_captured: ALWAYS_CAPTURED.iter().map(|s| s.to_string()).collect(),
    })
});

impl SignatureTable {
    /// The process-wide built-in table.
    pub fn builtin() -> Arc<SignatureTable> {
        Arc::clone(&BUILTIN)
    }

    /// Copy of the built-in table with extra package prefixes appended
    /// after the built-in ones.
    pub fn with_packages<I>(extra: I) -> SignatureTable
    where
        I: IntoIterator<Item = PackageSignature>,
    {
        let mut table = (**BUILTIN).clone();
        table.packages.extend(extra);
        table
    }

    pub fn category_signatures(&self) -> &[CategorySignature] {
        &self.categories
    }

    pub fn package_signatures(&self) -> &[PackageSignature] {
        &self.packages
    }

    /// First category signature matching the type name.
    pub fn category_for(&self, simple_name: &str, qualified_name: &str) -> Option<Category> {
        self.categories
            .iter()
            .find(|sig| sig.matches(simple_name, qualified_name))
            .map(|sig| sig.category)
    }

    /// Origin of a known package prefix, without the generic heuristic.
    pub fn known_origin(&self, owner: &str) -> Option<PackageOrigin> {
        self.packages
            .iter()
            .find(|sig| owner.starts_with(sig.prefix.as_str()))
            .map(|sig| sig.origin)
    }

    /// Origin of a frame owner: known prefixes first, then the heuristic.
    pub fn origin_of(&self, owner: &str) -> Option<PackageOrigin> {
        if let Some(origin) = self.known_origin(owner) {
            return Some(origin);
        }
        let excluded = self
            .generic_excluded
            .iter()
            .any(|prefix| owner.starts_with(prefix.as_str()));
        if !excluded && self.generic.is_match(owner) {
            return Some(PackageOrigin::Generic);
        }
        None
    }

    /// Whether an error with this simple name bypasses the category flags.
    pub fn is_always_captured(&self, simple_name: &str) -> bool {
        self.always_captured.iter().any(|name| name == simple_name)
    }
}

/// Identifier for the package owning `owner`: the third package segment
/// when there are at least three, else the second.
pub fn package_identifier(owner: &str) -> &str {
    let package = owner.rsplit_once('.').map(|(pkg, _)| pkg).unwrap_or(owner);
    let mut segments = package.split('.');
    let first = segments.next();
    let second = segments.next();
    let third = segments.next();
    third.or(second).or(first).unwrap_or(package)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFLECTIVE_NAMES: &[&str] = &[
        "ReflectiveOperationException",
        "ClassNotFoundException",
        "NoSuchMethodException",
        "NoSuchFieldException",
        "IllegalAccessException",
        "InstantiationException",
        "InvocationTargetException",
    ];

    fn table() -> Arc<SignatureTable> {
        SignatureTable::builtin()
    }

    #[test]
    fn test_builtin_tables_compile() {
        let t = table();
        assert_eq!(t.category_signatures().len(), CATEGORY_PATTERNS.len());
        assert_eq!(t.package_signatures().len(), PACKAGE_PREFIXES.len());
    }

    #[test]
    fn test_category_suffixes() {
        let t = table();
        let cat = |simple: &str| t.category_for(simple, simple);
        assert_eq!(cat("FooBarIOException"), Some(Category::Io));
        assert_eq!(cat("UncheckedIOException"), Some(Category::Io));
        assert_eq!(cat("MyRuntimeException"), Some(Category::Runtime));
        assert_eq!(cat("ConcurrentModificationException"), Some(Category::Concurrent));
        assert_eq!(cat("ClassNotFoundException"), Some(Category::Reflection));
        assert_eq!(cat("SecurityException"), Some(Category::Security));
        assert_eq!(cat("SocketTimeoutException"), Some(Category::Network));
        assert_eq!(cat("ConnectException"), Some(Category::Network));
        assert_eq!(cat("UnknownHostException"), Some(Category::Network));
        assert_eq!(cat("NumberFormatException"), Some(Category::Parse));
        assert_eq!(cat("DateTimeParseException"), Some(Category::Parse));
        assert_eq!(cat("JsonSyntaxException"), Some(Category::Data));
        assert_eq!(cat("CommandSyntaxException"), Some(Category::Platform));
        assert_eq!(cat("TextureLoadException"), Some(Category::Graphics));
        assert_eq!(cat("OutOfMemoryError"), Some(Category::Memory));
        assert_eq!(cat("IllegalStateException"), None);
        assert_eq!(cat("StackOverflowError"), None);
    }

    #[test]
    fn test_first_signature_wins() {
        let t = table();
        // matches both Parse and Data; Parse is listed first
        assert_eq!(
            t.category_for("JsonParseException", "com.google.gson.JsonParseException"),
            Some(Category::Parse)
        );
    }

    #[test]
    fn test_qualified_name_is_consulted() {
        let t = table();
        assert_eq!(
            t.category_for("Inner", "com.example.Outer$SocketProblemException"),
            Some(Category::Network)
        );
        assert_eq!(
            t.category_for("Whatever", "com.example.DiskIOException"),
            Some(Category::Io)
        );
    }

    #[test]
    fn test_origins() {
        let t = table();
        assert_eq!(
            t.origin_of("net.minecraft.server.MinecraftServer"),
            Some(PackageOrigin::HostPlatform)
        );
        assert_eq!(
            t.origin_of("net.fabricmc.loader.impl.FabricLoaderImpl"),
            Some(PackageOrigin::HostFramework)
        );
        assert_eq!(
            t.origin_of("me.jellysquid.mods.lithium.common.Foo"),
            Some(PackageOrigin::Library)
        );
        assert_eq!(
            t.origin_of("com.example.mymod.Thing"),
            Some(PackageOrigin::Generic)
        );
        assert_eq!(t.origin_of("java.util.concurrent.FutureTask"), None);
        assert_eq!(t.origin_of("org.apache.logging.log4j.core.Logger"), None);
        assert_eq!(t.origin_of("com.example.Thing"), None);
    }

    #[test]
    fn test_package_identifier() {
        assert_eq!(package_identifier("com.example.mymod.Thing"), "mymod");
        assert_eq!(package_identifier("net.minecraft.server.MinecraftServer"), "server");
        assert_eq!(package_identifier("net.minecraft.Bootstrap"), "minecraft");
        assert_eq!(package_identifier("a.b.c.d.e.F"), "c");
        assert_eq!(package_identifier("solo.Type"), "solo");
        assert_eq!(package_identifier("Bare"), "Bare");
    }

    #[test]
    fn test_always_captured() {
        let t = table();
        assert!(t.is_always_captured("CloneNotSupportedException"));
        assert!(t.is_always_captured("InterruptedException"));
        assert!(!t.is_always_captured("IOException"));
        assert!(!t.is_always_captured("IllegalStateException"));
    }

    #[test]
    fn test_reflective_family_is_always_captured() {
        let t = table();
        for name in REFLECTIVE_NAMES {
            assert!(t.is_always_captured(name), "{} should always be captured", name);
            assert_eq!(t.category_for(name, name), Some(Category::Reflection));
        }
    }

    #[test]
    fn test_with_packages_appends() {
        let t = SignatureTable::with_packages([PackageSignature::new(
            PackageOrigin::Library,
            "org.example.",
        )]);
        assert_eq!(t.known_origin("org.example.Foo"), Some(PackageOrigin::Library));
        assert_eq!(
            t.known_origin("net.minecraft.Foo"),
            Some(PackageOrigin::HostPlatform)
        );
    }
}
