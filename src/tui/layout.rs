//! Width breakpoints for table layout.
//!
//! Render code asks for a breakpoint instead of comparing widths itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    /// < 70 cols: essential columns only
    Compact,
    /// 70-119 cols
    Normal,
    /// 120+ cols: every column
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=69 => Breakpoint::Compact,
            70..=119 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }

    pub fn at_least(&self, min: Breakpoint) -> bool {
        *self >= min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(40), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(69), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(70), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(119), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(120), Breakpoint::Wide);
    }

    #[test]
    fn at_least_comparisons() {
        let normal = Breakpoint::Normal;
        assert!(normal.at_least(Breakpoint::Compact));
        assert!(normal.at_least(Breakpoint::Normal));
        assert!(!normal.at_least(Breakpoint::Wide));
    }
}
