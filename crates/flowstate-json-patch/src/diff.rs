//! Structural diff: generate a patch that transforms one document into another.
//!
//! Objects are compared key by key, arrays by a longest-common-subsequence
//! walk over the region left after trimming the shared prefix and suffix.
//! Everything else (scalars, strings, type changes) becomes a `replace`.

use serde_json::{Map, Value};

use super::types::{Op, Patch, Path};

/// Arrays whose trimmed middle would need a larger LCS table than this are
/// diffed position by position instead.
const MAX_LCS_CELLS: usize = 1 << 22;

// ── Public API ────────────────────────────────────────────────────────────

/// Generate a patch that transforms `src` into `dst`.
///
/// Equal inputs produce an empty patch, and applying the result to `src`
/// yields a document equal to `dst`.
///
/// # Example
///
/// ```
/// use flowstate_json_patch::{apply_patch, diff};
/// use serde_json::json;
///
/// let src = json!({"audio": {"volume": 1.0, "muted": false}});
/// let dst = json!({"audio": {"volume": 0.5, "muted": false}});
/// let patch = diff(&src, &dst);
/// assert_eq!(patch.len(), 1);
/// assert_eq!(apply_patch(&src, &patch).unwrap(), dst);
/// ```
pub fn diff(src: &Value, dst: &Value) -> Patch {
    let mut ops = Vec::new();
    diff_at_path(&mut ops, &Path::root(), src, dst);
    ops
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_at_path(ops: &mut Patch, path: &Path, src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(ops, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(ops, path, s, d),
        _ => ops.push(Op::Replace { path: path.clone(), value: dst.clone() }),
    }
}

fn diff_obj(ops: &mut Patch, path: &Path, src: &Map<String, Value>, dst: &Map<String, Value>) {
    for key in src.keys() {
        if !dst.contains_key(key) {
            ops.push(Op::Remove { path: path.child(key.as_str()) });
        }
    }
    for (key, dst_val) in dst {
        let p = path.child(key.as_str());
        match src.get(key) {
            None => ops.push(Op::Add { path: p, value: dst_val.clone() }),
            Some(src_val) => diff_at_path(ops, &p, src_val, dst_val),
        }
    }
}

fn diff_arr(ops: &mut Patch, path: &Path, src: &[Value], dst: &[Value]) {
    let prefix = src.iter().zip(dst).take_while(|(a, b)| a == b).count();
    let suffix = src[prefix..]
        .iter()
        .rev()
        .zip(dst[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let src_mid = &src[prefix..src.len() - suffix];
    let dst_mid = &dst[prefix..dst.len() - suffix];

    let cells = (src_mid.len() + 1).saturating_mul(dst_mid.len() + 1);
    if cells > MAX_LCS_CELLS {
        diff_arr_positional(ops, path, prefix, src_mid, dst_mid);
    } else {
        diff_arr_lcs(ops, path, prefix, src_mid, dst_mid);
    }
}

/// Walk the LCS table of `src` × `dst`, emitting ops against the array as it
/// is mutated; `pos` is the index in the partially patched array.
fn diff_arr_lcs(ops: &mut Patch, path: &Path, offset: usize, src: &[Value], dst: &[Value]) {
    let n = src.len();
    let m = dst.len();
    // lcs[i][j] = LCS length of src[i..] and dst[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if src[i] == dst[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let (mut i, mut j, mut pos) = (0, 0, offset);
    while i < n || j < m {
        if i < n && j < m {
            if src[i] == dst[j] {
                i += 1;
                j += 1;
                pos += 1;
                continue;
            }
            // Pairing these two elements costs nothing in common length:
            // recurse into them in place.
            if lcs[i + 1][j + 1] == lcs[i][j] {
                diff_at_path(ops, &path.index(pos), &src[i], &dst[j]);
                i += 1;
                j += 1;
                pos += 1;
                continue;
            }
        }
        if j < m && (i == n || lcs[i][j + 1] >= lcs[i + 1][j]) {
            ops.push(Op::Add { path: path.index(pos), value: dst[j].clone() });
            j += 1;
            pos += 1;
        } else {
            ops.push(Op::Remove { path: path.index(pos) });
            i += 1;
        }
    }
}

fn diff_arr_positional(ops: &mut Patch, path: &Path, offset: usize, src: &[Value], dst: &[Value]) {
    let common = src.len().min(dst.len());
    for k in 0..common {
        diff_at_path(ops, &path.index(offset + k), &src[k], &dst[k]);
    }
    for (k, value) in dst.iter().enumerate().skip(common) {
        ops.push(Op::Add { path: path.index(offset + k), value: value.clone() });
    }
    // Removing at a fixed index drains the tail
    for _ in common..src.len() {
        ops.push(Op::Remove { path: path.index(offset + common) });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
