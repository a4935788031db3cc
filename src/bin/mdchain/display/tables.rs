use std::io::{self, Write};

use mdchain::{Simulation, SimulationMode, Snapshot};

use crate::util::text::{label_list, truncate};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_run_summary(sim: &Simulation) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let identity = match sim.project_filename() {
        Ok(name) => name,
        Err(_) => "(not minted)".to_string(),
    };
    let b = &sim.sim_box;

    let rows = vec![
        ("Project", sim.project.clone()),
        ("Mode", sim.mode().to_string()),
        ("Project File", identity),
        (
            "Duration",
            format!("{} (+{} before)", sim.duration(), sim.previous_duration()),
        ),
        ("Frames", format!("{} every {}", sim.frame_count(), sim.period)),
        ("kT / dt", format!("{} / {}", sim.kt, sim.dt)),
        ("Seed", sim.seed.to_string()),
        ("Box", format!("{} × {} × {}", b.lx, b.ly, b.lz)),
        ("Particles", sim.particle_count().to_string()),
    ];

    print_kv_table(&mut out, "Run Summary", &rows);
}

pub fn print_lineage(sim: &Simulation) {
    let (relation, ancestor) = match sim.mode() {
        SimulationMode::Run => return,
        SimulationMode::Continue(simd) => ("Continues", simd),
        SimulationMode::Fork(simd) => ("Forked From", simd),
    };

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let source = match sim.source_trajectory() {
        Ok(Some(path)) => path.display().to_string(),
        _ => "-".to_string(),
    };
    let rows = vec![
        (relation, ancestor.file.clone()),
        ("Start Frame", sim.start_from().to_string()),
        ("Trajectory", source),
    ];

    print_kv_table(&mut out, "Lineage", &rows);
}

pub fn print_entities(sim: &Simulation) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut rows: Vec<[String; 3]> = Vec::new();
    if let Ok(bodies) = sim.rigid_bodies() {
        for (body, count) in bodies {
            let center = body
                .center()
                .map(|p| p.label.clone())
                .unwrap_or_else(|_| "?".to_string());
            let satellites: Vec<&str> = body.non_center().map(|p| p.label.as_str()).collect();
            rows.push([
                body.label.clone(),
                count.to_string(),
                format!("{center} + {}", label_list(&satellites)),
            ]);
        }
    }
    if let Ok(solvents) = sim.solvents() {
        for (particle, count) in solvents {
            rows.push([particle.label.clone(), count.to_string(), "solvent".to_string()]);
        }
    }
    print_table(&mut out, "Contents", ["Label", "Count", "Members"], &rows);

    let rows: Vec<[String; 3]> = sim
        .interactions()
        .iter()
        .map(|i| {
            [
                format!("{}-{}", i.p1_label, i.p2_label),
                format!("{} / {}", i.epsilon, i.sigma),
                i.alpha.to_string(),
            ]
        })
        .collect();
    print_table(&mut out, "Interactions", ["Pair", "ε / σ", "α"], &rows);
}

pub fn print_snapshot_summary(snapshot: &Snapshot) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let mut counts = vec![0usize; snapshot.types.len()];
    for particle in &snapshot.particles {
        if let Some(count) = counts.get_mut(particle.type_id) {
            *count += 1;
        }
    }

    let rows: Vec<[String; 3]> = snapshot
        .types
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > 0)
        .map(|(label, count)| {
            let pct = *count as f64 / snapshot.len().max(1) as f64 * 100.0;
            [label.clone(), count.to_string(), format!("{pct:.1}%")]
        })
        .collect();

    print_table(&mut out, "Starting Snapshot", ["Type", "Count", "Share"], &rows);
}

fn print_table(out: &mut impl Write, title: &str, header: [&str; 3], rows: &[[String; 3]]) {
    let first_w = 12usize;
    let second_w = 12usize;
    let sep_overhead = 8;
    let third_w = SAFE_TABLE_WIDTH.saturating_sub(first_w + second_w + sep_overhead);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{left}{}{mid}{}{mid}{}{right}",
            INDENT,
            "─".repeat(first_w + 2),
            "─".repeat(second_w + 2),
            "─".repeat(third_w + 2),
        )
    };

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(out, "{}", rule("┌", "┬", "┐"));
    let _ = writeln!(
        out,
        "{}│ {:<first_w$} │ {:>second_w$} │ {:<third_w$} │",
        INDENT, header[0], header[1], header[2],
    );
    let _ = writeln!(out, "{}", rule("├", "┼", "┤"));

    if rows.is_empty() {
        let _ = writeln!(
            out,
            "{}│ {:<first_w$} │ {:>second_w$} │ {:<third_w$} │",
            INDENT, "-", "-", "(none)",
        );
    }
    for [a, b, c] in rows {
        let _ = writeln!(
            out,
            "{}│ {:<first_w$} │ {:>second_w$} │ {:<third_w$} │",
            INDENT,
            truncate(a, first_w),
            truncate(b, second_w),
            truncate(c, third_w),
        );
    }

    let _ = writeln!(out, "{}", rule("└", "┴", "┘"));
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}
