//! Dependency ordering of top-level changes.
//!
//! Every change becomes a node of a directed graph whose edges mean "must run before".
//! Cycles are broken by detaching foreign keys: a table creation is split into the
//! creation without the key followed by a ModifyTable adding it, a table drop is
//! preceded by a ModifyTable dropping the key. Each round detaches a single pair of
//! changes per cycle: the endpoints of its first detachable edge in key order, with
//! every detachable edge between them in either direction. Only foreign key edges are
//! detachable; a cycle of hard edges is reported as [`OrderError::UnresolvableCycle`].

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::catalog::{Column, ForeignKey, Index, Object, Table};
use crate::diff::cascade::sort_table_changes;
use crate::diff::operations::{Change, ChangeKind};
use crate::error::OrderError;

/// (schema, name)
type QualifiedName = (String, String);

/// Tie-break key of a node: original position, then drop-side splits before the
/// change they came from and add-side splits after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Key {
    origin: usize,
    phase: u8,
    seq: usize,
}

#[derive(Debug)]
struct Node {
    change: Change,
    key: Key,
    /// Split off while breaking a cycle; its edges are never detached again.
    detached: bool,
}

/// How an edge can be removed.
#[derive(Debug, Clone, PartialEq)]
enum Detach {
    /// Move the target's foreign keys referencing this table into a later change.
    Add(QualifiedName),
    /// Move the source's drops of foreign keys referencing this table into an earlier change.
    Drop(QualifiedName),
}

type Graph = DiGraph<usize, Option<Detach>>;

/// Order `changes` so that every change runs after the changes it depends on. Changes
/// without a mutual constraint keep their relative input order.
pub fn order_changes(changes: Vec<Change>) -> Result<Vec<Change>, OrderError> {
    let mut nodes: Vec<Node> = changes
        .into_iter()
        .enumerate()
        .map(|(origin, change)| Node {
            change,
            key: Key {
                origin,
                phase: 1,
                seq: 0,
            },
            detached: false,
        })
        .collect();
    let mut seq = 0;

    loop {
        let graph = build_graph(&nodes);
        let cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .collect();
        if cycles.is_empty() {
            return Ok(sort(&graph, nodes));
        }

        let mut add_side: BTreeMap<usize, BTreeSet<QualifiedName>> = BTreeMap::new();
        let mut drop_side: BTreeMap<usize, BTreeSet<QualifiedName>> = BTreeMap::new();
        for scc in &cycles {
            let members: BTreeSet<NodeIndex> = scc.iter().copied().collect();
            let inner: Vec<_> = graph
                .edge_references()
                .filter(|e| e.weight().is_some())
                .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
                .collect();
            let Some(first) = inner
                .iter()
                .min_by_key(|e| (nodes[e.source().index()].key, nodes[e.target().index()].key))
            else {
                return Err(unresolvable(&nodes, scc));
            };
            let ends = [first.source(), first.target()];
            for edge in inner
                .iter()
                .filter(|e| ends.contains(&e.source()) && ends.contains(&e.target()))
            {
                match edge.weight() {
                    Some(Detach::Add(table)) => {
                        add_side
                            .entry(edge.target().index())
                            .or_default()
                            .insert(table.clone());
                    }
                    Some(Detach::Drop(table)) => {
                        drop_side
                            .entry(edge.source().index())
                            .or_default()
                            .insert(table.clone());
                    }
                    None => {}
                }
            }
        }

        let before = seq;
        nodes = split(nodes, &add_side, &drop_side, &mut seq);
        if seq == before {
            // nothing could be moved out, the cycle stays
            let graph = build_graph(&nodes);
            let scc = tarjan_scc(&graph)
                .into_iter()
                .find(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
                .unwrap_or_default();
            return Err(unresolvable(&nodes, &scc));
        }
    }
}

fn build_graph(nodes: &[Node]) -> Graph {
    let mut graph = Graph::new();
    let idx: Vec<NodeIndex> = (0..nodes.len()).map(|i| graph.add_node(i)).collect();

    for (i, a) in nodes.iter().enumerate() {
        for (j, b) in nodes.iter().enumerate() {
            if i != j && hard_edge(&a.change, &b.change) {
                graph.add_edge(idx[i], idx[j], None);
            }
        }
    }

    // pieces of one split change keep their relative order
    let mut chains: BTreeMap<usize, Vec<(Key, usize)>> = BTreeMap::new();
    for (i, n) in nodes.iter().enumerate() {
        chains.entry(n.key.origin).or_default().push((n.key, i));
    }
    for mut chain in chains.into_values() {
        chain.sort();
        for pair in chain.windows(2) {
            graph.add_edge(idx[pair[0].1], idx[pair[1].1], None);
        }
    }

    for (j, adder) in nodes.iter().enumerate() {
        let Some(owner) = owner_schema(&adder.change) else {
            continue;
        };
        for fk in added_foreign_keys(&adder.change) {
            let target = (fk.ref_schema_or(owner).to_string(), fk.ref_table.clone());
            let weight = (!adder.detached).then(|| Detach::Add(target.clone()));
            for (i, provider) in nodes.iter().enumerate() {
                if i == j {
                    if let Change::AddTable(t) = &adder.change
                        && fk.is_self_reference(owner)
                        && !t.has_key_on(&fk.ref_columns)
                    {
                        graph.add_edge(idx[i], idx[j], weight.clone());
                    }
                } else if provides(&provider.change, &target, &fk.ref_columns) {
                    graph.add_edge(idx[i], idx[j], weight.clone());
                }
            }
        }
    }

    for (j, dropper) in nodes.iter().enumerate() {
        let Some(owner) = owner_schema(&dropper.change) else {
            continue;
        };
        for fk in dropped_foreign_keys(&dropper.change) {
            let target = (fk.ref_schema_or(owner).to_string(), fk.ref_table.clone());
            let weight = (!dropper.detached).then(|| Detach::Drop(target.clone()));
            for (i, releaser) in nodes.iter().enumerate() {
                if i != j && releases(&releaser.change, &target, &fk.ref_columns) {
                    graph.add_edge(idx[j], idx[i], weight.clone());
                }
            }
        }
    }

    graph
}

/// Whether `a` must run before `b` regardless of foreign keys.
fn hard_edge(a: &Change, b: &Change) -> bool {
    match (a, b) {
        (Change::AddSchema(s), other) => {
            !matches!(other, Change::AddSchema(_)) && other.schema_name() == Some(s.name.as_str())
        }
        (other, Change::DropSchema(s)) => {
            !matches!(other, Change::DropSchema(_)) && other.schema_name() == Some(s.name.as_str())
        }

        // table lifecycle
        (Change::AddTable(_) | Change::RenameTable { .. }, Change::ModifyTable { table, .. }) => {
            same_table(a, &table.schema, &table.name)
        }
        (Change::ModifyTable { table, .. }, Change::DropTable(t)) => {
            table.schema == t.schema && table.name == t.name
        }
        (Change::DropTable(t), Change::AddTable(_) | Change::RenameTable { .. }) => {
            same_table(b, &t.schema, &t.name)
        }
        (
            Change::RenameTable { schema, from, .. },
            Change::AddTable(_) | Change::RenameTable { .. },
        ) => same_table(b, schema, from),

        // enum types
        (Change::AddObject(o) | Change::ModifyObject { to: o, .. }, user) => {
            enum_key(o).is_some_and(|key| enum_uses(user).contains(&key))
        }
        (releaser, Change::DropObject(o)) => {
            enum_key(o).is_some_and(|key| enum_releases(releaser).contains(&key))
        }
        (Change::DropObject(o), Change::AddObject(p)) => o.id() == p.id(),

        _ => false,
    }
}

fn same_table(change: &Change, schema: &str, name: &str) -> bool {
    change.schema_name() == Some(schema) && change.table_name() == Some(name)
}

fn owner_schema(change: &Change) -> Option<&str> {
    match change {
        Change::AddTable(t) | Change::DropTable(t) | Change::ModifyTable { table: t, .. } => {
            Some(&t.schema)
        }
        _ => None,
    }
}

fn added_foreign_keys(change: &Change) -> Vec<&ForeignKey> {
    match change {
        Change::AddTable(t) => t.foreign_keys.iter().collect(),
        Change::ModifyTable { changes, .. } => changes
            .iter()
            .filter_map(|c| match c {
                Change::AddForeignKey(fk) | Change::ModifyForeignKey { to: fk, .. } => Some(fk),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn dropped_foreign_keys(change: &Change) -> Vec<&ForeignKey> {
    match change {
        Change::DropTable(t) => t.foreign_keys.iter().collect(),
        Change::ModifyTable { changes, .. } => changes
            .iter()
            .filter_map(|c| match c {
                Change::DropForeignKey(fk) | Change::ModifyForeignKey { from: fk, .. } => Some(fk),
                Change::Cascaded(inner) => match inner.as_ref() {
                    Change::DropForeignKey(fk) => Some(fk),
                    _ => None,
                },
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_table(t: &Table, target: &QualifiedName) -> bool {
    t.schema == target.0 && t.name == target.1
}

/// Whether `change` creates the referenced table or the key a foreign key points at.
fn provides(change: &Change, target: &QualifiedName, columns: &[String]) -> bool {
    match change {
        Change::AddTable(t) => is_table(t, target),
        Change::RenameTable { schema, to, .. } => *schema == target.0 && *to == target.1,
        Change::ModifyTable { table, changes } => {
            is_table(table, target) && changes.iter().any(|c| builds_key(c, columns))
        }
        _ => false,
    }
}

/// Whether `change` removes the referenced table or the key a foreign key points at.
fn releases(change: &Change, target: &QualifiedName, columns: &[String]) -> bool {
    match change {
        Change::DropTable(t) => is_table(t, target),
        Change::ModifyTable { table, changes } => {
            is_table(table, target) && changes.iter().any(|c| breaks_key(c, columns))
        }
        _ => false,
    }
}

const KEY_FACETS: ChangeKind = ChangeKind::TYPE
    .union(ChangeKind::CHARSET)
    .union(ChangeKind::COLLATE);

fn covers(column: &Column, columns: &[String]) -> bool {
    columns.contains(&column.name)
}

fn overlaps(index: &Index, columns: &[String]) -> bool {
    index
        .column_names()
        .iter()
        .any(|n| columns.iter().any(|c| c == n))
}

fn builds_key(change: &Change, columns: &[String]) -> bool {
    match change {
        Change::AddColumn(c) | Change::RenameColumn { to: c, .. } => covers(c, columns),
        Change::ModifyColumn { to, change, .. } => {
            change.intersects(KEY_FACETS) && covers(to, columns)
        }
        Change::AddPrimaryKey(i) | Change::ModifyPrimaryKey { to: i, .. } => overlaps(i, columns),
        Change::AddIndex(i) | Change::ModifyIndex { to: i, .. } | Change::RenameIndex { to: i, .. } => {
            i.unique && overlaps(i, columns)
        }
        _ => false,
    }
}

fn breaks_key(change: &Change, columns: &[String]) -> bool {
    match change {
        Change::Cascaded(inner) => breaks_key(inner, columns),
        Change::DropColumn(c) => covers(c, columns),
        Change::ModifyColumn { from, change, .. } => {
            change.intersects(KEY_FACETS) && covers(from, columns)
        }
        Change::DropPrimaryKey(i) | Change::ModifyPrimaryKey { from: i, .. } => {
            overlaps(i, columns)
        }
        Change::DropIndex(i) | Change::ModifyIndex { from: i, .. } => {
            i.unique && overlaps(i, columns)
        }
        _ => false,
    }
}

fn enum_key(o: &Object) -> Option<QualifiedName> {
    matches!(o, Object::Enum { .. }).then(|| (o.schema().to_string(), o.name().to_string()))
}

fn column_enum(table: &Table, column: &Column) -> Option<QualifiedName> {
    column
        .ty
        .ty
        .enum_ref()
        .map(|(schema, name)| (schema.unwrap_or(&table.schema).to_string(), name.to_string()))
}

fn enum_uses(change: &Change) -> Vec<QualifiedName> {
    match change {
        Change::AddTable(t) => t.enum_refs(),
        Change::ModifyTable { table, changes } => changes
            .iter()
            .filter_map(|c| match c {
                Change::AddColumn(col) | Change::ModifyColumn { to: col, .. } => {
                    column_enum(table, col)
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn enum_releases(change: &Change) -> Vec<QualifiedName> {
    match change {
        Change::DropTable(t) => t.enum_refs(),
        Change::ModifyTable { table, changes } => changes
            .iter()
            .filter_map(|c| match c {
                Change::DropColumn(col) | Change::ModifyColumn { from: col, .. } => {
                    column_enum(table, col)
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn references(fk: &ForeignKey, owner: &str, targets: &BTreeSet<QualifiedName>) -> bool {
    targets.contains(&(fk.ref_schema_or(owner).to_string(), fk.ref_table.clone()))
}

/// Move the foreign keys of `change` referencing `targets` into a ModifyTable that runs
/// after it.
fn detach_adds(change: &mut Change, targets: &BTreeSet<QualifiedName>) -> Option<Change> {
    match change {
        Change::AddTable(t) => {
            let table = t.clone();
            let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut t.foreign_keys)
                .into_iter()
                .partition(|fk| references(fk, &t.schema, targets));
            t.foreign_keys = kept;
            (!moved.is_empty()).then(|| Change::ModifyTable {
                table,
                changes: moved.into_iter().map(Change::AddForeignKey).collect(),
            })
        }
        Change::ModifyTable { table, changes } => {
            let mut moved = Vec::new();
            let mut kept = Vec::new();
            for c in std::mem::take(changes) {
                match c {
                    Change::AddForeignKey(fk) if references(&fk, &table.schema, targets) => {
                        moved.push(Change::AddForeignKey(fk));
                    }
                    Change::ModifyForeignKey { from, to, .. }
                        if references(&to, &table.schema, targets) =>
                    {
                        kept.push(Change::DropForeignKey(from));
                        moved.push(Change::AddForeignKey(to));
                    }
                    other => kept.push(other),
                }
            }
            sort_table_changes(&mut kept);
            *changes = kept;
            (!moved.is_empty()).then(|| Change::ModifyTable {
                table: table.clone(),
                changes: moved,
            })
        }
        _ => None,
    }
}

/// Move the foreign key drops of `change` referencing `targets` into a ModifyTable that
/// runs before it.
fn detach_drops(change: &mut Change, targets: &BTreeSet<QualifiedName>) -> Option<Change> {
    match change {
        Change::DropTable(t) => {
            let table = t.clone();
            let (moved, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut t.foreign_keys)
                .into_iter()
                .partition(|fk| references(fk, &t.schema, targets));
            t.foreign_keys = kept;
            (!moved.is_empty()).then(|| Change::ModifyTable {
                table,
                changes: moved.into_iter().map(Change::DropForeignKey).collect(),
            })
        }
        Change::ModifyTable { table, changes } => {
            let mut moved = Vec::new();
            let mut kept = Vec::new();
            for c in std::mem::take(changes) {
                match c {
                    Change::DropForeignKey(fk) if references(&fk, &table.schema, targets) => {
                        moved.push(Change::DropForeignKey(fk));
                    }
                    // dropped ahead of its columns, so it needs its own statement
                    Change::Cascaded(inner)
                        if matches!(inner.as_ref(), Change::DropForeignKey(fk) if references(fk, &table.schema, targets)) =>
                    {
                        moved.push(*inner);
                    }
                    Change::ModifyForeignKey { from, to, .. }
                        if references(&from, &table.schema, targets) =>
                    {
                        moved.push(Change::DropForeignKey(from));
                        kept.push(Change::AddForeignKey(to));
                    }
                    other => kept.push(other),
                }
            }
            *changes = kept;
            (!moved.is_empty()).then(|| Change::ModifyTable {
                table: table.clone(),
                changes: moved,
            })
        }
        _ => None,
    }
}

fn split(
    nodes: Vec<Node>,
    add_side: &BTreeMap<usize, BTreeSet<QualifiedName>>,
    drop_side: &BTreeMap<usize, BTreeSet<QualifiedName>>,
    seq: &mut usize,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len() + add_side.len() + drop_side.len());
    for (i, mut node) in nodes.into_iter().enumerate() {
        let origin = node.key.origin;

        if let Some(targets) = drop_side.get(&i)
            && let Some(change) = detach_drops(&mut node.change, targets)
        {
            debug!("Detached foreign key drops from {}: {}", node.change, change);
            *seq += 1;
            out.push(Node {
                change,
                key: Key {
                    origin,
                    phase: 0,
                    seq: *seq,
                },
                detached: true,
            });
        }

        let added = add_side
            .get(&i)
            .and_then(|targets| detach_adds(&mut node.change, targets));

        if let Some(change) = &added {
            debug!("Detached foreign keys from {}: {}", node.change, change);
        }
        let emptied = matches!(&node.change, Change::ModifyTable { changes, .. } if changes.is_empty());
        if !emptied {
            out.push(node);
        }

        if let Some(change) = added {
            *seq += 1;
            out.push(Node {
                change,
                key: Key {
                    origin,
                    phase: 2,
                    seq: *seq,
                },
                detached: true,
            });
        }
    }
    out
}

/// Kahn's algorithm, always emitting the ready node with the smallest key.
fn sort(graph: &Graph, nodes: Vec<Node>) -> Vec<Change> {
    let mut indegree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.edges_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<(Key, NodeIndex)> = graph
        .node_indices()
        .filter(|n| indegree[n.index()] == 0)
        .map(|n| (nodes[n.index()].key, n))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some((_, n)) = ready.pop_first() {
        order.push(n.index());
        for m in graph.neighbors_directed(n, Direction::Outgoing) {
            indegree[m.index()] -= 1;
            if indegree[m.index()] == 0 {
                ready.insert((nodes[m.index()].key, m));
            }
        }
    }

    let mut slots: Vec<Option<Change>> = nodes.into_iter().map(|n| Some(n.change)).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

fn unresolvable(nodes: &[Node], scc: &[NodeIndex]) -> OrderError {
    let mut members: Vec<&Node> = scc.iter().map(|n| &nodes[n.index()]).collect();
    members.sort_by_key(|n| n.key);
    let tables = members
        .iter()
        .filter_map(|n| {
            let table = n.change.table_name()?;
            Some(match n.change.schema_name() {
                Some(schema) => format!("{schema}.{table}"),
                None => table.to_string(),
            })
        })
        .sorted()
        .dedup()
        .collect();
    OrderError::UnresolvableCycle {
        tables,
        changes: members.iter().map(|n| n.change.to_string()).collect(),
    }
}
