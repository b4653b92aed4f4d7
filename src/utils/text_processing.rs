// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// 提取正文时忽略的元素
pub const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "template", "svg",
];

/// 块级元素，前后各产生一个换行
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li",
    "main", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// 规范化空白字符
///
/// 每行去除首尾空白，丢弃空行，再以 `\n` 连接；行内空白保持原样
///
/// # 参数
///
/// * `text` - 原始文本
///
/// # 返回值
///
/// 规范化后的文本
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 从HTML文档中提取可见正文
///
/// 跳过脚本、样式、导航、页眉和页脚，块级元素按行分隔
///
/// # 参数
///
/// * `html` - HTML文档
///
/// # 返回值
///
/// 规范化后的纯文本
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    collect_text(body, &mut out);
    normalize_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if EXCLUDED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}
