//! HTML/SVG/MathML tag tables.

static HTML_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "html", "body", "base", "head", "link", "meta", "style", "title", "address",
    "article", "aside", "footer", "header", "hgroup", "h1", "h2", "h3", "h4",
    "h5", "h6", "nav", "section", "div", "dd", "dl", "dt", "figcaption",
    "figure", "picture", "hr", "img", "li", "main", "ol", "p", "pre", "ul",
    "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em",
    "i", "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small", "span",
    "strong", "sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map",
    "track", "video", "embed", "object", "param", "source", "canvas", "script",
    "noscript", "del", "ins", "caption", "col", "colgroup", "table", "thead",
    "tbody", "td", "th", "tr", "button", "datalist", "fieldset", "form",
    "input", "label", "legend", "meter", "optgroup", "option", "output",
    "progress", "select", "textarea", "details", "dialog", "menu", "summary",
    "template", "blockquote", "iframe", "tfoot", "search",
};

static SVG_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "svg", "animate", "animateMotion", "animateTransform", "circle", "clipPath",
    "defs", "desc", "ellipse", "feBlend", "feColorMatrix", "feComposite",
    "feFlood", "feGaussianBlur", "feImage", "feMerge", "feOffset", "filter",
    "foreignObject", "g", "image", "line", "linearGradient", "marker", "mask",
    "metadata", "path", "pattern", "polygon", "polyline", "radialGradient",
    "rect", "stop", "switch", "symbol", "text", "textPath", "tspan", "use",
    "view",
};

static MATH_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "math", "mi", "mn", "mo", "ms", "mspace", "mtext", "mrow", "mfrac",
    "msqrt", "mroot", "msub", "msup", "msubsup", "mtable", "mtr", "mtd",
};

static VOID_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
};

pub fn is_html_tag(tag: &str) -> bool {
    HTML_TAGS.contains(tag)
}

pub fn is_svg_tag(tag: &str) -> bool {
    SVG_TAGS.contains(tag)
}

pub fn is_math_ml_tag(tag: &str) -> bool {
    MATH_TAGS.contains(tag)
}

/// Elements that never have children or a closing tag.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

/// Any tag the browser knows natively.
pub fn is_native_tag(tag: &str) -> bool {
    is_html_tag(tag) || is_svg_tag(tag) || is_math_ml_tag(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_tables() {
        assert!(is_html_tag("div"));
        assert!(is_svg_tag("circle"));
        assert!(is_void_tag("input"));
        assert!(!is_void_tag("div"));
        assert!(is_native_tag("mrow"));
        assert!(!is_native_tag("my-comp"));
    }
}
