//! Platform binding emission.
//!
//! Bindings hide the differences the `USE_` symbols alone cannot: how a
//! socket call reports failure, which interval timer drives the heartbeat,
//! which `stat` variant backs the generic name, and so on.

use crate::core::binding::{Binding, BindingTable};
use crate::core::capability::CapabilitySet;
use crate::core::family::OsFamily;
use crate::core::import::{DeclarationImport, ImportSet};
use crate::core::selection::SelectionTable;

/// Capability flags the emitter consults beyond the catalogue's own.
pub const BINDING_CAPABILITIES: &[&str] = &[
    "has-shut-rd",
    "has-shut-wr",
    "has-sd-receive",
    "has-sd-send",
    "has-netdb-internal",
    "has-netdb-success",
];

/// Emit the bindings for a resolved platform.
pub fn emit_bindings(
    family: OsFamily,
    selections: &SelectionTable,
    capabilities: &CapabilitySet,
    imports: &ImportSet,
) -> BindingTable {
    let mut table = BindingTable::new();

    if selections.option("networking").is_some() {
        emit_socket_bindings(&mut table, family, capabilities);
    }
    emit_heartbeat(&mut table, selections);
    if imports.contains(DeclarationImport::NetdbH) {
        if imports.available(capabilities).contains(DeclarationImport::NetdbH) {
            table.insert(Binding::symbol("USE_h_errno"));
        }
        emit_netdb_fallbacks(&mut table, capabilities);
    }
    emit_stat_aliases(&mut table, selections);
    emit_environ(&mut table, selections);

    tracing::debug!("emitted {} bindings", table.len());
    table
}

fn emit_socket_bindings(table: &mut BindingTable, family: OsFamily, capabilities: &CapabilitySet) {
    let Some(sockets) = family.strategy().sockets else {
        tracing::warn!("networking selected but {} has no socket conventions", family);
        return;
    };

    table.extend([
        Binding::type_name("SOCKET_TYPE", sockets.handle_type),
        Binding::expr("SOCKET_CALL_ERROR(s)", sockets.call_failed),
        Binding::expr("SOCKET_CALL_ERROR2(s)", sockets.invalid_handle),
        Binding::expr("CONNECT_IN_PROGRESS", sockets.connect_in_progress),
        Binding::expr("CONNECT_WOULD_BLOCK", sockets.connect_would_block),
        Binding::expr("NOT_CONNECTED(e)", sockets.not_connected),
        Binding::expr("CLOSE_SOCKET(s)", sockets.close),
        Binding::expr("ERR_CODE_FROM_SOCKET_CALL", sockets.last_error),
        Binding::expr("IOCTL_SOCKET(s,cmd,argp)", sockets.ioctl),
        Binding::type_name("SOCKET_LEN_TYPE", sockets.length_type),
    ]);

    table.insert(shutdown_binding(
        "SHUTDOWN_RD",
        capabilities,
        [("has-shut-rd", "SHUT_RD"), ("has-sd-receive", "SD_RECEIVE")],
        0,
    ));
    table.insert(shutdown_binding(
        "SHUTDOWN_WR",
        capabilities,
        [("has-shut-wr", "SHUT_WR"), ("has-sd-send", "SD_SEND")],
        1,
    ));
}

/// The first named constant the platform has, else the numeric value both
/// BSD and Winsock use.
fn shutdown_binding(
    name: &str,
    capabilities: &CapabilitySet,
    constants: [(&str, &str); 2],
    fallback: i64,
) -> Binding {
    constants
        .iter()
        .find(|(flag, _)| capabilities.has(flag))
        .map(|(_, constant)| Binding::expr(name, *constant))
        .unwrap_or_else(|| Binding::integer(name, fallback))
}

fn emit_heartbeat(table: &mut BindingTable, selections: &SelectionTable) {
    let (itimer, signal) = if selections.is_selected("heartbeat-timer", "itimer_virtual") {
        ("ITIMER_VIRTUAL", "SIGVTALRM")
    } else {
        ("ITIMER_REAL", "SIGALRM")
    };
    table.insert(Binding::expr("HEARTBEAT_ITIMER", itimer));
    table.insert(Binding::expr("HEARTBEAT_SIG", signal));
}

fn emit_netdb_fallbacks(table: &mut BindingTable, capabilities: &CapabilitySet) {
    if !capabilities.has("has-netdb-internal") {
        table.insert(Binding::integer("NETDB_INTERNAL", -1));
    }
    if !capabilities.has("has-netdb-success") {
        table.insert(Binding::integer("NETDB_SUCCESS", 0));
    }
}

fn emit_stat_aliases(table: &mut BindingTable, selections: &SelectionTable) {
    let (ty, stat, lstat, fstat) = match selections.option("stat") {
        Some("stat64") => ("struct stat64", "stat64", "lstat64", "fstat64"),
        Some(_) => ("struct stat", "stat", "lstat", "fstat"),
        None => return,
    };
    table.extend([
        Binding::type_name("___struct_stat", ty),
        Binding::expr("___stat", stat),
        Binding::expr("___lstat", lstat),
        Binding::expr("___fstat", fstat),
    ]);
}

fn emit_environ(table: &mut BindingTable, selections: &SelectionTable) {
    match selections.option("environ") {
        Some("environ") => table.insert(Binding::declaration(
            "environ",
            "extern char **environ;",
        )),
        Some("nsgetenviron") => table.insert(Binding::expr("environ", "(*_NSGetEnviron())")),
        _ => {}
    }
}
