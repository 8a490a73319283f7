//! Reveal animation kinds.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::GlyphfallError;

/// The animation a reveal target plays when it first becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    Fade,
    SlideFromLeft,
    StaggeredFade,
    Pulse,
    SkillReveal,
    TypewriterOnce,
    TypewriterScroll,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 7] = [
        AnimationKind::Fade,
        AnimationKind::SlideFromLeft,
        AnimationKind::StaggeredFade,
        AnimationKind::Pulse,
        AnimationKind::SkillReveal,
        AnimationKind::TypewriterOnce,
        AnimationKind::TypewriterScroll,
    ];

    /// Tag used in page content.
    pub fn tag(self) -> &'static str {
        match self {
            AnimationKind::Fade => "fade",
            AnimationKind::SlideFromLeft => "slide-from-left",
            AnimationKind::StaggeredFade => "staggered-fade",
            AnimationKind::Pulse => "pulse",
            AnimationKind::SkillReveal => "skill-reveal",
            AnimationKind::TypewriterOnce => "typewriter-once",
            AnimationKind::TypewriterScroll => "typewriter-scroll",
        }
    }

    /// Whether the kind reveals text character by character.
    pub fn is_typewriter(self) -> bool {
        matches!(
            self,
            AnimationKind::TypewriterOnce | AnimationKind::TypewriterScroll
        )
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for AnimationKind {
    type Err = GlyphfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AnimationKind::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GlyphfallError::UnknownAnimationKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for kind in AnimationKind::ALL {
            assert_eq!(kind.tag().parse::<AnimationKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert_eq!(
            "wobble".parse::<AnimationKind>(),
            Err(GlyphfallError::UnknownAnimationKind("wobble".into()))
        );
    }

    #[test]
    fn only_text_kinds_are_typewriters() {
        let typewriters: Vec<_> = AnimationKind::ALL
            .into_iter()
            .filter(|k| k.is_typewriter())
            .collect();
        assert_eq!(
            typewriters,
            vec![AnimationKind::TypewriterOnce, AnimationKind::TypewriterScroll]
        );
    }
}
