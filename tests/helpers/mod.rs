//! Shared AST builders for the integration tests
//!
//! Each test file does `mod helpers;` and builds documents with these
//! instead of spelling out JSON.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use ec_graph::ast::{
    Annotation, AnnotationArg, ChannelClause, FlowChain, FlowStepRef, MessageIo, OwnsRef,
};
use ec_graph::{Definition, DefinitionKind, MessageKind, MessageStmt, Program, ResourceRef, Statement};

static TRACING: Once = Once::new();

/// Opt into engine logs with `RUST_LOG=ec_graph=trace cargo test`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn program(defs: Vec<Definition>) -> Program {
    init_tracing();
    Program::new(defs)
}

pub fn def(kind: DefinitionKind, name: &str) -> Definition {
    Definition::new(kind, name)
}

pub fn versioned(kind: DefinitionKind, name: &str, version: &str) -> Definition {
    Definition::new(kind, name).with(Statement::version(version))
}

pub fn view(name: &str, items: Vec<Definition>) -> Definition {
    items
        .into_iter()
        .fold(Definition::new(DefinitionKind::Visualizer, name), Definition::nest)
}

/// A view whose body holds arbitrary statements (refs, options, ...)
pub fn view_of(name: &str, stmts: Vec<Statement>) -> Definition {
    stmts
        .into_iter()
        .fold(Definition::new(DefinitionKind::Visualizer, name), Definition::with)
}

pub fn nested(def: Definition) -> Statement {
    Statement::Definition(Box::new(def))
}

pub fn sends(kind: MessageKind, name: &str) -> MessageStmt {
    MessageStmt::new(kind, name)
}

pub fn event(name: &str) -> MessageStmt {
    MessageStmt::new(MessageKind::Event, name)
}

pub fn sends_stmt(msg: MessageStmt) -> Statement {
    Statement::Sends(msg)
}

pub fn receives_stmt(msg: MessageStmt) -> Statement {
    Statement::Receives(msg)
}

pub fn rref(raw: &str) -> ResourceRef {
    ResourceRef::parse(raw)
}

pub fn route(raw: &str) -> Statement {
    Statement::Route(ResourceRef::parse(raw))
}

pub fn to(channels: &[&str]) -> Statement {
    Statement::To(ChannelClause::of(channels.iter().copied()))
}

pub fn input(kind: MessageKind, raw: &str) -> Statement {
    Statement::Input(MessageIo {
        message_type: kind,
        reference: ResourceRef::parse(raw),
    })
}

pub fn output(kind: MessageKind, raw: &str) -> Statement {
    Statement::Output(MessageIo {
        message_type: kind,
        reference: ResourceRef::parse(raw),
    })
}

pub fn chain(sources: &[&str], targets: &[FlowStepRef]) -> Statement {
    Statement::FlowChain(FlowChain {
        sources: sources.iter().map(|s| FlowStepRef::new(*s)).collect(),
        targets: targets.to_vec(),
    })
}

pub fn owns(kind: DefinitionKind, name: &str) -> Statement {
    Statement::Owns(OwnsRef {
        resource_type: kind,
        name: name.to_string(),
    })
}

pub fn note(content: &str, author: Option<&str>) -> Statement {
    let mut args = vec![AnnotationArg::Positional(content.to_string())];
    if let Some(author) = author {
        args.push(AnnotationArg::Named {
            key: "author".to_string(),
            value: author.to_string(),
        });
    }
    Statement::Annotation(Annotation {
        name: "note".to_string(),
        args,
    })
}
