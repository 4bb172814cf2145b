use regex::Regex;

/// Converts generated article text into the simple HTML dialect the
/// platform's editor accepts, and pulls hashtags out of the source text.
///
/// The conversion is deliberately small: headings up to level three,
/// unordered lists, fenced code blocks, bold, italic and inline code.
/// Lines that already start with a markup tag pass through untouched so
/// converted output survives a second pass unchanged.
pub struct MarkdownTransformer {
    hashtag_re: Regex,
    code_re: Regex,
    bold_re: Regex,
    italic_re: Regex,
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self {
            hashtag_re: Regex::new(r"#([^\s#]\S*)").unwrap(),
            code_re: Regex::new(r"`([^`]+)`").unwrap(),
            bold_re: Regex::new(r"\*\*([^*]+)\*\*").unwrap(),
            italic_re: Regex::new(r"\*([^*]+)\*").unwrap(),
        }
    }

    /// Returns the hashtags in order of appearance (duplicates kept) and
    /// the converted markup. Hashtag tokens stay visible in the markup.
    pub fn transform(&self, markdown: &str) -> (Vec<String>, String) {
        let hashtags = self.extract_hashtags(markdown);
        let markup = self.to_markup(markdown);
        (hashtags, markup)
    }

    fn extract_hashtags(&self, markdown: &str) -> Vec<String> {
        self.hashtag_re
            .captures_iter(markdown)
            .map(|capture| capture[1].to_string())
            .collect()
    }

    fn to_markup(&self, markdown: &str) -> String {
        let mut html: Vec<String> = Vec::new();
        let mut paragraph: Vec<String> = Vec::new();
        let mut in_list = false;
        let mut in_code_block = false;

        for raw_line in markdown.lines() {
            let line = raw_line.trim_end();

            if in_code_block {
                if line.trim_start().starts_with("```") || line == "</code></pre>" {
                    html.push("</code></pre>".to_string());
                    in_code_block = false;
                } else {
                    html.push(raw_line.to_string());
                }
                continue;
            }

            // A converted opening tag also starts a raw block; interior
            // lines, blank ones included, are never re-wrapped.
            if line.trim_start().starts_with("```") || line == "<pre><code>" {
                self.flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                html.push("<pre><code>".to_string());
                in_code_block = true;
                continue;
            }

            if line.is_empty() {
                self.flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                continue;
            }

            if let Some(heading) = self.heading_line(line) {
                self.flush_paragraph(&mut html, &mut paragraph);
                close_list(&mut html, &mut in_list);
                html.push(heading);
                continue;
            }

            if let Some(item) = line.strip_prefix("- ") {
                self.flush_paragraph(&mut html, &mut paragraph);
                if !in_list {
                    html.push("<ul>".to_string());
                    in_list = true;
                }
                html.push(format!("<li>{}</li>", self.apply_inline(item)));
                continue;
            }

            close_list(&mut html, &mut in_list);
            paragraph.push(line.to_string());
        }

        self.flush_paragraph(&mut html, &mut paragraph);
        close_list(&mut html, &mut in_list);
        if in_code_block {
            html.push("</code></pre>".to_string());
        }

        html.join("\n")
    }

    fn heading_line(&self, line: &str) -> Option<String> {
        for (marker, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
            if let Some(text) = line.strip_prefix(marker) {
                return Some(format!(
                    "<h{level}>{}</h{level}>",
                    self.apply_inline(text.trim_start())
                ));
            }
        }
        None
    }

    fn flush_paragraph(&self, html: &mut Vec<String>, paragraph: &mut Vec<String>) {
        if paragraph.is_empty() {
            return;
        }
        let lines: Vec<String> = paragraph.drain(..).collect();
        if lines[0].starts_with('<') {
            // Already markup, keep it as-is instead of double-wrapping.
            html.extend(lines);
        } else {
            let joined = lines.join("<br>");
            html.push(format!("<p>{}</p>", self.apply_inline(&joined)));
        }
    }

    fn apply_inline(&self, text: &str) -> String {
        let text = self.code_re.replace_all(text, "<code>$1</code>");
        let text = self.bold_re.replace_all(&text, "<strong>$1</strong>");
        let text = self.italic_re.replace_all(&text, "<em>$1</em>");
        text.into_owned()
    }
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn close_list(html: &mut Vec<String>, in_list: &mut bool) {
    if *in_list {
        html.push("</ul>".to_string());
        *in_list = false;
    }
}
