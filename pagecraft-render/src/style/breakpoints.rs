//! Responsive breakpoints and the shared lookup used wherever a per-breakpoint value is read.

/// Editor breakpoints, widest first. Styles cascade desktop-first through `max-width`
/// media queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Breakpoint {
    Desktop,
    Tablet,
    Mobile,
    MobilePortrait,
}

impl Breakpoint {
    /// Fallback chain, walked from a breakpoint back toward `Desktop`.
    pub const CHAIN: [Breakpoint; 4] = [
        Breakpoint::Desktop,
        Breakpoint::Tablet,
        Breakpoint::Mobile,
        Breakpoint::MobilePortrait,
    ];

    pub fn parse(id: &str) -> Option<Breakpoint> {
        match id {
            "desktop" => Some(Breakpoint::Desktop),
            "tablet" => Some(Breakpoint::Tablet),
            "mobile" => Some(Breakpoint::Mobile),
            "mobilePortrait" | "mobile_portrait" | "mobile-portrait" => {
                Some(Breakpoint::MobilePortrait)
            }
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The next wider breakpoint, `None` for desktop.
    pub fn parent(self) -> Option<Breakpoint> {
        self.index().checked_sub(1).map(|i| Self::CHAIN[i])
    }

    pub fn max_width_px(self) -> Option<u32> {
        match self {
            Breakpoint::Desktop => None,
            Breakpoint::Tablet => Some(991),
            Breakpoint::Mobile => Some(767),
            Breakpoint::MobilePortrait => Some(479),
        }
    }

    pub fn media_query(self) -> Option<String> {
        self.max_width_px()
            .map(|px| format!("@media (max-width: {px}px)"))
    }
}

/// A value with a mandatory desktop entry and optional narrower overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Responsive<T> {
    pub desktop: T,
    pub tablet: Option<T>,
    pub mobile: Option<T>,
    pub mobile_portrait: Option<T>,
}

impl<T> Responsive<T> {
    pub fn new(desktop: T) -> Self {
        Self {
            desktop,
            tablet: None,
            mobile: None,
            mobile_portrait: None,
        }
    }

    /// Set the value for one breakpoint. Setting `Desktop` replaces the base value.
    pub fn set(&mut self, breakpoint: Breakpoint, value: T) {
        match breakpoint {
            Breakpoint::Desktop => self.desktop = value,
            Breakpoint::Tablet => self.tablet = Some(value),
            Breakpoint::Mobile => self.mobile = Some(value),
            Breakpoint::MobilePortrait => self.mobile_portrait = Some(value),
        }
    }

    pub fn with(mut self, breakpoint: Breakpoint, value: T) -> Self {
        self.set(breakpoint, value);
        self
    }

    /// The value defined exactly at `breakpoint`, without fallback.
    pub fn get(&self, breakpoint: Breakpoint) -> Option<&T> {
        match breakpoint {
            Breakpoint::Desktop => Some(&self.desktop),
            Breakpoint::Tablet => self.tablet.as_ref(),
            Breakpoint::Mobile => self.mobile.as_ref(),
            Breakpoint::MobilePortrait => self.mobile_portrait.as_ref(),
        }
    }

    /// Walk from `breakpoint` toward desktop and return the first defined value.
    pub fn resolve(&self, breakpoint: Breakpoint) -> &T {
        Breakpoint::CHAIN[..=breakpoint.index()]
            .iter()
            .rev()
            .find_map(|bp| self.get(*bp))
            .unwrap_or(&self.desktop)
    }
}

/// Free-function form of [`Responsive::resolve`] for callers holding a plain value.
pub fn resolve<T>(value: &Responsive<T>, breakpoint: Breakpoint) -> &T {
    value.resolve(breakpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_only_resolves_everywhere() {
        let v = Responsive::new(10);
        for bp in Breakpoint::CHAIN {
            assert_eq!(*resolve(&v, bp), 10);
        }
    }

    #[test]
    fn narrower_breakpoints_inherit_nearest_override() {
        let v = Responsive::new("d").with(Breakpoint::Tablet, "t");
        assert_eq!(*v.resolve(Breakpoint::Desktop), "d");
        assert_eq!(*v.resolve(Breakpoint::Tablet), "t");
        assert_eq!(*v.resolve(Breakpoint::Mobile), "t");
        assert_eq!(*v.resolve(Breakpoint::MobilePortrait), "t");

        let v = v.with(Breakpoint::MobilePortrait, "p");
        assert_eq!(*v.resolve(Breakpoint::Mobile), "t");
        assert_eq!(*v.resolve(Breakpoint::MobilePortrait), "p");
    }

    #[test]
    fn parse_and_chain() {
        assert_eq!(Breakpoint::parse("mobile-portrait"), Some(Breakpoint::MobilePortrait));
        assert_eq!(Breakpoint::parse("watch"), None);
        assert_eq!(Breakpoint::MobilePortrait.parent(), Some(Breakpoint::Mobile));
        assert_eq!(Breakpoint::Desktop.parent(), None);
        assert_eq!(
            Breakpoint::Tablet.media_query().as_deref(),
            Some("@media (max-width: 991px)")
        );
        assert_eq!(Breakpoint::Desktop.media_query(), None);
    }
}
