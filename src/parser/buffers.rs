//! The growable buffers backing each syntactic region.

/// One buffer per syntactic region of the grammar. Each buffer is reset to
/// empty when its region is emitted, and appended to with amortized O(1)
/// cost, so regions of arbitrary length parse in bounded time.
///
/// The overflow sweep ([`Parser::write`] after crossing the check
/// position) inspects every buffer through [`Buffers::lengths`].
///
/// [`Parser::write`]: super::Parser::write
#[derive(Debug, Default)]
pub(super) struct Buffers {
    pub attribute_name: String,
    pub attribute_value: String,
    pub cdata: String,
    pub comment: String,
    pub doctype: String,
    pub entity: String,
    pub proc_inst_name: String,
    pub proc_inst_body: String,
    pub sgml_decl: String,
    pub tag_name: String,
    pub text_node: String,
    pub script: String,
}

impl Buffers {
    /// Resets every buffer to empty, keeping the allocations.
    pub fn clear(&mut self) {
        self.attribute_name.clear();
        self.attribute_value.clear();
        self.cdata.clear();
        self.comment.clear();
        self.doctype.clear();
        self.entity.clear();
        self.proc_inst_name.clear();
        self.proc_inst_body.clear();
        self.sgml_decl.clear();
        self.tag_name.clear();
        self.text_node.clear();
        self.script.clear();
    }

    /// The name and current byte length of every buffer, for the overflow
    /// sweep.
    pub fn lengths(&self) -> [(&'static str, usize); 12] {
        [
            ("attribute_name", self.attribute_name.len()),
            ("attribute_value", self.attribute_value.len()),
            ("cdata", self.cdata.len()),
            ("comment", self.comment.len()),
            ("doctype", self.doctype.len()),
            ("entity", self.entity.len()),
            ("proc_inst_name", self.proc_inst_name.len()),
            ("proc_inst_body", self.proc_inst_body.len()),
            ("sgml_decl", self.sgml_decl.len()),
            ("tag_name", self.tag_name.len()),
            ("text_node", self.text_node.len()),
            ("script", self.script.len()),
        ]
    }
}
