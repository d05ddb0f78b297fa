use std::collections::HashMap;
use std::sync::OnceLock;

/// Component kinds the renderer knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Container,
    Section,
    Row,
    Column,
    Text,
    Heading,
    Image,
    Button,
    Link,
    Divider,
    Spacer,
    Icon,
    IconText,
    Video,
    HtmlBlock,
    List,
}

/// Editor type tags and the kind each one renders as.
const TYPE_TAGS: &[(&str, ComponentKind)] = &[
    ("Container", ComponentKind::Container),
    ("Box", ComponentKind::Container),
    ("Div", ComponentKind::Container),
    ("Section", ComponentKind::Section),
    ("Row", ComponentKind::Row),
    ("Columns", ComponentKind::Row),
    ("Column", ComponentKind::Column),
    ("Col", ComponentKind::Column),
    ("Text", ComponentKind::Text),
    ("RichText", ComponentKind::Text),
    ("Paragraph", ComponentKind::Text),
    ("Heading", ComponentKind::Heading),
    ("Title", ComponentKind::Heading),
    ("Image", ComponentKind::Image),
    ("Picture", ComponentKind::Image),
    ("Button", ComponentKind::Button),
    ("Link", ComponentKind::Link),
    ("TextLink", ComponentKind::Link),
    ("Divider", ComponentKind::Divider),
    ("Separator", ComponentKind::Divider),
    ("Spacer", ComponentKind::Spacer),
    ("Icon", ComponentKind::Icon),
    ("IconText", ComponentKind::IconText),
    ("IconBox", ComponentKind::IconText),
    ("Feature", ComponentKind::IconText),
    ("Video", ComponentKind::Video),
    ("VideoEmbed", ComponentKind::Video),
    ("HtmlBlock", ComponentKind::HtmlBlock),
    ("Html", ComponentKind::HtmlBlock),
    ("CustomHtml", ComponentKind::HtmlBlock),
    ("Embed", ComponentKind::HtmlBlock),
    ("List", ComponentKind::List),
];

fn type_tag_index() -> &'static HashMap<&'static str, ComponentKind> {
    static INDEX: OnceLock<HashMap<&'static str, ComponentKind>> = OnceLock::new();
    INDEX.get_or_init(|| TYPE_TAGS.iter().copied().collect())
}

impl ComponentKind {
    /// Look up the kind for an editor type tag. Unknown tags return `None` and render as a
    /// generic wrapper.
    pub fn from_type_tag(tag: &str) -> Option<ComponentKind> {
        type_tag_index().get(tag).copied()
    }
}

/// Tags a container may render as, via its `htmlTag` prop.
pub const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "aside", "nav", "header", "footer", "main",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_kinds() {
        assert_eq!(ComponentKind::from_type_tag("Box"), Some(ComponentKind::Container));
        assert_eq!(ComponentKind::from_type_tag("Title"), Some(ComponentKind::Heading));
        assert_eq!(ComponentKind::from_type_tag("Embed"), Some(ComponentKind::HtmlBlock));
        assert_eq!(ComponentKind::from_type_tag("heading"), None);
        assert_eq!(ComponentKind::from_type_tag(""), None);
    }

    #[test]
    fn every_kind_has_a_tag() {
        let kinds: std::collections::HashSet<_> = TYPE_TAGS.iter().map(|(_, k)| *k).collect();
        assert_eq!(kinds.len(), 16);
    }
}
