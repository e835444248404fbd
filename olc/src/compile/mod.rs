pub mod labels;
mod method;
pub mod slots;

use crate::error::Error;
use crate::grammer::ast::{ClassDecl, MethodDecl, Program};
use arch::inst::{Inst, Label, Value};
use bimap::BiMap;
use color_print::cformat;
use labels::LabelGen;
use method::MethodCompiler;
use serde::Serialize;
use std::fmt;

/// Name of the synthetic initializer method every class gets
pub const INIT_METHOD: &str = "this";

/// Class and method used as entry point when no `main` exists
pub const DEFAULT_CLASS: &str = "Program";
pub const DEFAULT_ENTRY: &str = "Main";

const ENTRY_METHOD: &str = "main";

#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub classes: Vec<ClassCode>,
    pub entry: String, // "Class.method"
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassCode {
    pub name: String,
    pub base: Option<String>,
    pub fields: Vec<String>,
    pub methods: Vec<MethodCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodCode {
    pub name: String,
    pub params: Vec<String>,
    pub slots: Vec<String>, // slot index -> local name
    pub code: Vec<Inst>,
    pub labels: BiMap<Label, usize>,
}

/// Lower every class of `program` to stack machine code
pub fn compile(program: &Program) -> Result<Artifact, Error> {
    let mut label_gen = LabelGen::new();
    let mut classes = Vec::new();
    for class in &program.classes {
        classes.push(compile_class(program, class, &mut label_gen)?);
    }

    let entry = program
        .classes
        .iter()
        .find(|class| class.method(ENTRY_METHOD).is_some())
        .map(|class| format!("{}.{}", class.name, ENTRY_METHOD));
    let entry = match entry {
        Some(entry) => entry,
        None => {
            classes.push(default_entry());
            format!("{}.{}", DEFAULT_CLASS, DEFAULT_ENTRY)
        }
    };

    Ok(Artifact { classes, entry })
}

fn compile_class(
    program: &Program,
    class: &ClassDecl,
    label_gen: &mut LabelGen,
) -> Result<ClassCode, Error> {
    let mut methods = vec![compile_init(program, class, label_gen)?];
    for method in class.methods() {
        methods.push(compile_method(program, class, method, label_gen)?);
    }
    Ok(ClassCode {
        name: class.name.clone(),
        base: class.base.clone(),
        fields: class.fields().map(|field| field.name.clone()).collect(),
        methods,
    })
}

/// Field initializers, then the `this` block
fn compile_init(
    program: &Program,
    class: &ClassDecl,
    label_gen: &mut LabelGen,
) -> Result<MethodCode, Error> {
    let mut compiler = MethodCompiler::new(program, class, &[], label_gen);
    let mut code = Vec::new();
    for field in class.fields() {
        code.extend(compiler.compile_field(field)?);
    }
    code.extend(compiler.compile_block(&class.init)?);
    code.push(Inst::Ret);

    Ok(MethodCode {
        name: INIT_METHOD.to_string(),
        params: Vec::new(),
        slots: compiler.into_slots(),
        labels: labels::index(&code),
        code,
    })
}

fn compile_method(
    program: &Program,
    class: &ClassDecl,
    method: &MethodDecl,
    label_gen: &mut LabelGen,
) -> Result<MethodCode, Error> {
    let mut compiler = MethodCompiler::new(program, class, &method.params, label_gen);
    let mut code = compiler.compile_block(&method.body)?;
    if method.ret.is_none() && code.last() != Some(&Inst::Ret) {
        code.push(Inst::Ret);
    }

    Ok(MethodCode {
        name: method.name.clone(),
        params: method.params.iter().map(|param| param.name.clone()).collect(),
        slots: compiler.into_slots(),
        labels: labels::index(&code),
        code,
    })
}

fn default_entry() -> ClassCode {
    ClassCode {
        name: DEFAULT_CLASS.to_string(),
        base: None,
        fields: Vec::new(),
        methods: vec![MethodCode {
            name: DEFAULT_ENTRY.to_string(),
            params: Vec::new(),
            slots: Vec::new(),
            code: vec![Inst::Const(Value::Int(0)), Inst::Ret],
            labels: BiMap::new(),
        }],
    }
}

impl Artifact {
    pub fn class(&self, name: &str) -> Option<&ClassCode> {
        self.classes.iter().find(|class| class.name == name)
    }

    pub fn method(&self, class: &str, method: &str) -> Option<&MethodCode> {
        self.class(class)?
            .methods
            .iter()
            .find(|code| code.name == method)
    }

    /// Coloured listing for the terminal
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for class in &self.classes {
            out += &match &class.base {
                Some(base) => cformat!("<m,bold>.class</> <g>{}</> extends <g>{}</>\n", class.name, base),
                None => cformat!("<m,bold>.class</> <g>{}</>\n", class.name),
            };
            for field in &class.fields {
                out += &cformat!("  <m>.field</> {}\n", field);
            }
            for method in &class.methods {
                out += &cformat!(
                    "  <m>.method</> <g>{}</>({})\n",
                    method.name,
                    method.params.join(", ")
                );
                out += &cformat!("  <m>.locals</> {}\n", locals(&method.slots));
                for inst in &method.code {
                    out += &inst.cformat();
                    out.push('\n');
                }
            }
        }
        out += &cformat!("<m,bold>.entry</> <g>{}</>\n", self.entry);
        out
    }
}

fn locals(slots: &[String]) -> String {
    let items: Vec<String> = slots
        .iter()
        .enumerate()
        .map(|(slot, name)| format!("{}: {}", slot, name))
        .collect();
    format!("[{}]", items.join(", "))
}

/// Plain listing, written to files
impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for class in &self.classes {
            match &class.base {
                Some(base) => writeln!(f, ".class {} extends {}", class.name, base)?,
                None => writeln!(f, ".class {}", class.name)?,
            }
            for field in &class.fields {
                writeln!(f, "  .field {}", field)?;
            }
            for method in &class.methods {
                writeln!(f, "  .method {}({})", method.name, method.params.join(", "))?;
                writeln!(f, "  .locals {}", locals(&method.slots))?;
                for inst in &method.code {
                    match inst {
                        Inst::Label(_) => writeln!(f, "{}", inst)?,
                        _ => writeln!(f, "    {}", inst)?,
                    }
                }
            }
        }
        writeln!(f, ".entry {}", self.entry)
    }
}
