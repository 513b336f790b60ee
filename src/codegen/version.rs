//! JDK target selection: picks the class-file major/minor version and
//! gates target-specific emission paths (`StackMapTable`, `invokedynamic`
//! string-concat, VM-bug workarounds).

/// A supported source/target JDK release, 1.1 through 1.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetVersion {
    Jdk1_1,
    Jdk1_2,
    Jdk1_3,
    Jdk1_4,
    Jdk1_5,
    Jdk1_6,
    Jdk1_7,
    Jdk1_8,
}

impl TargetVersion {
    /// The `(major, minor)` class-file version pair for this target, per
    /// JVMS §4.1.
    pub fn major_minor(self) -> (u16, u16) {
        use self::TargetVersion::*;
        match self {
            Jdk1_1 => (45, 3),
            Jdk1_2 => (46, 0),
            Jdk1_3 => (47, 0),
            Jdk1_4 => (48, 0),
            Jdk1_5 => (49, 0),
            Jdk1_6 => (50, 0),
            Jdk1_7 => (51, 0),
            Jdk1_8 => (52, 0),
        }
    }

    /// `StackMapTable` is mandatory for class files at or above 51.0.
    pub fn requires_stack_map_table(self) -> bool {
        self >= TargetVersion::Jdk1_7
    }

    /// try/catch/finally lowering inlines the finally block at ≥ 1.7;
    /// below that a `JSR`/`RET` subroutine is used instead.
    pub fn inlines_finally(self) -> bool {
        self >= TargetVersion::Jdk1_7
    }

    /// String concatenation via `StringBuilder` requires ≥ 1.5; earlier
    /// targets fall back to the synchronized `StringBuffer`.
    pub fn has_string_builder(self) -> bool {
        self >= TargetVersion::Jdk1_5
    }

    /// `Class` literals (`T.class`) are a JVM primitive (`ldc Class`) from
    /// 1.5 onward; earlier targets synthesize a `class$` accessor method.
    pub fn has_ldc_class(self) -> bool {
        self >= TargetVersion::Jdk1_5
    }

    /// `Throwable.addSuppressed` (used by try-with-resources) exists from
    /// 1.7; below that, secondary close exceptions must be discarded
    /// (`nosuppressed`).
    pub fn has_suppressed_exceptions(self) -> bool {
        self >= TargetVersion::Jdk1_7
    }

    /// Works around a `TABLESWITCH` verifier bug present in the 1.2/1.3
    /// HotSpot VMs: those VMs reject a table whose `high` offset would
    /// overflow when combined with the instruction's own padding.
    pub fn needs_tableswitch_workaround(self) -> bool {
        self == TargetVersion::Jdk1_2 || self == TargetVersion::Jdk1_3
    }
}
