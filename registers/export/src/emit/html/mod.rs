// Licensed under the Apache-2.0 license

//! Browsable HTML reference documentation.
//!
//! The destination is a directory holding `index.html`, the node index in
//! `js/data.js`, one `content/<id>.html` fragment per node, static assets,
//! and any images referenced from descriptions. Node ids follow pre-order
//! visiting order, starting at zero for the top node.

pub mod data;
pub mod desc;
pub mod page;

use self::data::{data_js, RalEntry, RalField};
use self::desc::{bundle_images, promote_headings, Assets, DescRenderer, PlainText};
use self::page::{ChildRow, FieldRow};
use crate::access::AccessCode;
use crate::config::{HtmlOptions, WalkOptions};
use crate::error::ExportResult;
use crate::model::{Field, NodeKind};
use crate::output::Artifact;
use crate::session::ExportSession;
use crate::walk::{children, visit_children, visit_fields, Emitter, NodeRef};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const RALBOT_CSS: &str = include_str!("../../../static/css/ralbot.css");
const RALBOT_JS: &str = include_str!("../../../static/js/ralbot.js");

pub struct HtmlEmitter<R = PlainText> {
    options: HtmlOptions,
    renderer: R,
}

impl HtmlEmitter<PlainText> {
    pub fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            renderer: PlainText,
        }
    }
}

impl Default for HtmlEmitter<PlainText> {
    fn default() -> Self {
        Self::new(HtmlOptions::default())
    }
}

impl<R: DescRenderer> HtmlEmitter<R> {
    /// Use `renderer` for descriptions, e.g. a Markdown converter.
    pub fn with_renderer<T: DescRenderer>(self, renderer: T) -> HtmlEmitter<T> {
        HtmlEmitter {
            options: self.options,
            renderer,
        }
    }

    fn describe(
        &self,
        text: Option<&str>,
        source: Option<&Path>,
        assets: &mut Assets,
    ) -> ExportResult<Option<String>> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let html = promote_headings(&self.renderer.render(text), self.options.heading_offset);
        bundle_images(&html, source, assets).map(Some)
    }

    fn visit_node(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, HtmlState>,
    ) -> ExportResult<()> {
        let id = session.next_id() as usize;
        let parent = session.state.parents.last().copied();
        if let Some(p) = parent {
            session.state.index[p].children.push(id);
        }
        let source = node
            .node
            .source
            .clone()
            .or_else(|| session.state.sources.last().cloned().flatten());
        session.state.index.push(RalEntry {
            parent,
            children: Vec::new(),
            name: node.inst_name().to_string(),
            offset: node.address_offset(),
            size: node.size(),
            array: node
                .node
                .array
                .as_ref()
                .map(|a| (a.dimensions.clone(), a.stride)),
            fields: (node.kind() == NodeKind::Reg).then(Vec::new),
        });

        session.state.parents.push(id);
        session.state.sources.push(source.clone());
        let visited = match node.kind() {
            NodeKind::Reg => visit_fields(self, node, session),
            NodeKind::Mem => Ok(()),
            NodeKind::Addrmap | NodeKind::Regfile => visit_children(self, node, session),
        };
        session.state.parents.pop();
        session.state.sources.pop();
        visited?;

        let desc = self.describe(
            node.node.desc(),
            source.as_deref(),
            &mut session.state.assets,
        )?;
        let desc = desc.as_deref();
        let html = match node.kind() {
            NodeKind::Reg => {
                let rows = std::mem::take(&mut session.state.field_rows);
                page::register(node, desc, &rows)
            }
            NodeKind::Mem => page::memory(node, desc),
            NodeKind::Addrmap | NodeKind::Regfile => {
                let rows: Vec<ChildRow> = children(node, self.walk_options())
                    .iter()
                    .zip(&session.state.index[id].children)
                    .map(|(child, child_id)| ChildRow {
                        id: *child_id,
                        offset: child.address_offset(),
                        ident: page::array_ident(child),
                        name: child.node.display_name().map(str::to_string),
                    })
                    .collect();
                page::container(node, desc, &rows)
            }
        };
        session.state.pages.insert(id, html);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HtmlState {
    index: Vec<RalEntry>,
    /// Ids of the nodes currently being visited, innermost last.
    parents: Vec<usize>,
    /// Source file in effect for each open node.
    sources: Vec<Option<PathBuf>>,
    /// Fields of the register being visited.
    field_rows: Vec<FieldRow>,
    pages: BTreeMap<usize, String>,
    assets: Assets,
}

impl<R: DescRenderer> Emitter for HtmlEmitter<R> {
    type State = HtmlState;

    fn walk_options(&self) -> WalkOptions {
        WalkOptions::new().skip_not_present(self.options.skip_not_present)
    }

    /// Documentation is always one tree rooted at the top node.
    fn explodes(&self) -> bool {
        false
    }

    fn on_address_block(
        &self,
        node: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.visit_node(node, session)
    }

    fn on_register_file(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.visit_node(node, session)
    }

    fn on_register(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        super::check_register_array(node, session)?;
        self.visit_node(node, session)
    }

    fn on_memory(
        &self,
        node: &NodeRef<'_>,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        self.visit_node(node, session)
    }

    fn on_field(
        &self,
        field: &Field,
        access: AccessCode,
        _parent: &NodeRef<'_>,
        session: &mut ExportSession<'_, Self::State>,
    ) -> ExportResult<()> {
        let source = session.state.sources.last().cloned().flatten();
        let source = source.as_deref();
        let state = &mut session.state;

        let desc = self.describe(field.desc(), source, &mut state.assets)?;
        let mut encode = Vec::new();
        for value in field.encode().unwrap_or_default() {
            let desc = self.describe(value.desc.as_deref(), source, &mut state.assets)?;
            encode.push((value.name.clone(), value.value, desc));
        }

        let current = state.parents.last().copied();
        if let Some(fields) = current.and_then(|id| state.index[id].fields.as_mut()) {
            fields.push(RalField {
                name: field.inst_name.clone(),
                lsb: field.low(),
                msb: field.high(),
                reset: field.reset().unwrap_or(0),
                access: access.to_string(),
                encode: encode.iter().map(|(n, v, _)| (n.clone(), *v)).collect(),
            });
        }
        state.field_rows.push(FieldRow {
            ident: field.inst_name.clone(),
            low: field.low(),
            high: field.high(),
            access: access.to_string(),
            reset: field.reset(),
            name: field.display_name().map(str::to_string),
            desc,
            encode,
        });
        Ok(())
    }

    fn finish(&self, session: &mut ExportSession<'_, Self::State>) -> ExportResult<Artifact> {
        let top = session.cx().top;
        let title = match &self.options.title {
            Some(title) => title.clone(),
            None => format!(
                "{} Reference",
                top.display_name().unwrap_or(&top.inst_name)
            ),
        };
        let state = std::mem::take(&mut session.state);

        let mut files = BTreeMap::new();
        files.insert(
            PathBuf::from("index.html"),
            page::index(&title, &self.options).into_bytes(),
        );
        files.insert(
            PathBuf::from("js/data.js"),
            data_js(&state.index, &title)?.into_bytes(),
        );
        files.insert(PathBuf::from("js/ralbot.js"), RALBOT_JS.as_bytes().to_vec());
        files.insert(PathBuf::from("css/ralbot.css"), RALBOT_CSS.as_bytes().to_vec());
        for (id, html) in state.pages {
            files.insert(
                Path::new("content").join(format!("{id}.html")),
                html.into_bytes(),
            );
        }
        files.extend(state.assets);
        session.debug(format!("documented {} node(s)", state.index.len()));
        Ok(Artifact::Tree(files))
    }
}

#[cfg(test)]
mod tests {
    use super::desc::RawHtml;
    use super::*;
    use crate::diag::MemorySink;
    use crate::export;
    use crate::model::{EnumeratedValue, Node, PropertyValue};
    use std::fs;

    fn design() -> Node {
        Node::addrmap("chip")
            .prop("name", "Example Chip")
            .child(
                Node::reg("ctrl")
                    .prop("desc", "Main <control> register.")
                    .field(
                        Field::new("mode", 0, 1)
                            .prop("reset", 2u64)
                            .prop("name", "Mode")
                            .prop(
                                "encode",
                                PropertyValue::from(vec![
                                    EnumeratedValue::new("idle", 0),
                                    EnumeratedValue::new("run", 2).with_desc("Running"),
                                ]),
                            ),
                    ),
            )
            .child(
                Node::regfile("rf")
                    .at(0x100)
                    .child(Node::reg("entry").array(&[4], 4)),
            )
            .child(Node::reg("absent").at(0x200).prop("ispresent", false))
    }

    #[test]
    fn test_bundle_layout() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        let report = export(&HtmlEmitter::default(), &design(), &dest, &MemorySink::new()).unwrap();
        let names: Vec<String> = report
            .files
            .iter()
            .map(|p| p.strip_prefix(&dest).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            names,
            [
                "content/0.html",
                "content/1.html",
                "content/2.html",
                "content/3.html",
                "css/ralbot.css",
                "index.html",
                "js/data.js",
                "js/ralbot.js",
            ]
        );

        let index = fs::read_to_string(dest.join("index.html")).unwrap();
        assert!(index.contains("<title>Example Chip Reference</title>"));
        assert!(index.contains("<footer>Generated by RALBot HTML</footer>"));

        let data = fs::read_to_string(dest.join("js/data.js")).unwrap();
        assert!(data.starts_with("var RALIndex = [{\"parent\":null,\"children\":[1,2],\"name\":\"chip\""));
        assert!(data.contains(
            "{\"parent\":2,\"children\":[],\"name\":\"entry\",\"offset\":0x0n,\"size\":0x4n,\"dims\":[4],\"stride\":0x4n,\"idxs\":[0],\"fields\":[]}"
        ));
        assert!(data.contains("\"encode\":{\"idle\":0x0n,\"run\":0x2n}"));
        assert!(data.ends_with("var PageInfo = {\"title\":\"Example Chip Reference\"};\n"));
        assert!(!data.contains("absent"));
    }

    #[test]
    fn test_pages() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        export(&HtmlEmitter::default(), &design(), &dest, &MemorySink::new()).unwrap();

        let top = fs::read_to_string(dest.join("content/0.html")).unwrap();
        assert!(top.contains("<h1>Example Chip <small>chip</small></h1>"));
        // Offsets are padded to the width of the map's span.
        assert!(top.contains("<td>0x000</td><td><a class=\"node-link\" data-id=\"1\" href=\"#1\">ctrl</a>"));
        assert!(top.contains("<td>0x100</td><td><a class=\"node-link\" data-id=\"2\" href=\"#2\">rf</a>"));

        let ctrl = fs::read_to_string(dest.join("content/1.html")).unwrap();
        assert!(ctrl.contains("<p>Main &lt;control&gt; register.</p>"));
        assert!(ctrl.contains("<td>[1:0]</td><td>mode</td><td>RW</td><td>0x2</td><td>Mode</td>"));
        assert!(ctrl.contains("<tr><td>0x2</td><td>run</td><td><p>Running</p>\n</td></tr>"));

        let rf = fs::read_to_string(dest.join("content/2.html")).unwrap();
        assert!(rf.contains(">entry[4]</a>"));
        let entry = fs::read_to_string(dest.join("content/3.html")).unwrap();
        assert!(entry.contains("<tr><th>Array Dimensions</th><td>[4]</td></tr>"));
        assert!(entry.contains("<tr><th>Absolute Address</th><td>0x100</td></tr>"));
    }

    #[test]
    fn test_options() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        let options = HtmlOptions::default()
            .title("SoC Manual")
            .footer("ACME")
            .home_url("https://acme.example/")
            .skip_not_present(false);
        export(&HtmlEmitter::new(options), &design(), &dest, &MemorySink::new()).unwrap();

        let index = fs::read_to_string(dest.join("index.html")).unwrap();
        assert!(index.contains("<title>SoC Manual</title>"));
        assert!(index.contains("<a class=\"home\" href=\"https://acme.example/\">Home</a>"));
        assert!(index.contains("<footer>ACME</footer>"));
        let data = fs::read_to_string(dest.join("js/data.js")).unwrap();
        assert!(data.contains("\"name\":\"absent\""));
    }

    #[test]
    fn test_shared_image_bundled_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("block.png"), b"\x89PNG").unwrap();
        let rdl = dir.path().join("chip.rdl");
        let top = Node::addrmap("chip")
            .source(&rdl)
            .prop("desc", "<h1>Overview</h1><img src=\"block.png\" />")
            .child(Node::reg("a").prop("desc", "<img src=\"block.png\"/>"));
        let dest = dir.path().join("docs");
        let emitter =
            HtmlEmitter::new(HtmlOptions::default().heading_offset(2)).with_renderer(RawHtml);
        let report = export(&emitter, &top, &dest, &MemorySink::new()).unwrap();

        let images: Vec<_> = report
            .files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == "png"))
            .collect();
        assert_eq!(images.len(), 1);
        let name = images[0].file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_block.png"));

        let top_page = fs::read_to_string(dest.join("content/0.html")).unwrap();
        assert!(top_page.contains("<h3>Overview</h3>"));
        assert!(top_page.contains(&format!("<img src=\"content/{name}\" />")));
        let reg_page = fs::read_to_string(dest.join("content/1.html")).unwrap();
        assert!(reg_page.contains(&format!("<img src=\"content/{name}\"/>")));
    }

    #[test]
    fn test_overlapping_register_array_is_fatal() {
        let top = Node::addrmap("chip").child(Node::reg("r").array(&[2], 2));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("docs");
        assert!(export(&HtmlEmitter::default(), &top, &dest, &MemorySink::new()).is_err());
        assert!(!dest.exists());
    }
}
