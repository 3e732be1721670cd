use super::literal;
use crate::model::EnumId;
use crate::naming;
use crate::output::{CodeWriter, Context};

pub(super) fn emit(ctx: &Context<'_>, id: EnumId, out: &mut CodeWriter) {
    let info = ctx.model.enumeration(id);
    let name = naming::type_name(&info.name);
    let variants: Vec<String> = info
        .constants
        .iter()
        .map(|constant| naming::variant_name(&constant.name))
        .collect();

    out.blank();
    out.docs(info.docs.as_deref());
    out.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]");
    out.open(format!("pub enum {name}"));
    for (index, (constant, variant)) in info.constants.iter().zip(&variants).enumerate() {
        out.docs(constant.docs.as_deref());
        if index == 0 {
            out.line("#[default]");
        }
        out.line(format!("{variant},"));
    }
    out.close();

    out.blank();
    out.open(format!("impl {name}"));
    let all: Vec<String> = variants.iter().map(|v| format!("{name}::{v}")).collect();
    out.line(format!("pub const ALL: &'static [{name}] = &[{}];", all.join(", ")));

    out.blank();
    out.line("/// Binary code of the constant.");
    out.open("pub fn code(self) -> i32");
    out.open("match self");
    for (constant, variant) in info.constants.iter().zip(&variants) {
        out.line(format!("{name}::{variant} => {},", constant.code));
    }
    out.close();
    out.close();

    out.blank();
    out.line("/// Unknown codes resolve to the default constant.");
    out.open("pub fn from_code(code: i32) -> Self");
    out.open("match code");
    for (constant, variant) in info.constants.iter().zip(&variants) {
        out.line(format!("{} => {name}::{variant},", constant.code));
    }
    out.line("_ => Self::default(),");
    out.close();
    out.close();

    out.blank();
    out.line("/// JSON name of the constant.");
    out.open("pub fn name(self) -> &'static str");
    out.open("match self");
    for (constant, variant) in info.constants.iter().zip(&variants) {
        out.line(format!("{name}::{variant} => {},", literal(&constant.json_name)));
    }
    out.close();
    out.close();

    out.blank();
    out.line("/// Unknown names resolve to the default constant.");
    out.open("pub fn from_name(name: &str) -> Self");
    out.open("match name");
    for (constant, variant) in info.constants.iter().zip(&variants) {
        out.line(format!("{} => {name}::{variant},", literal(&constant.json_name)));
    }
    out.line("_ => Self::default(),");
    out.close();
    out.close();
    out.close();

    out.blank();
    out.open(format!("impl ::std::fmt::Display for {name}"));
    out.open("fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result");
    out.line("f.write_str(self.name())");
    out.close();
    out.close();
}
