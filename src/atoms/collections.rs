//! # Collection Operations
//!
//! Lists are immutable vectors and maps are persistent ordered maps keyed by
//! string. Every atom returns a new collection; nothing is updated in place.
//!
//! Higher-order atoms (`map`, `filter`, `fold`, `apply`) take any callable:
//! a lambda or an eager atom used as a value.

use std::cmp::Ordering;

use im::OrdMap;

use crate::ast::value::Value;
use crate::atoms::helpers::{
    check_arity, check_arity_range, check_min_arity, extract_index, ExtractValue,
};
use crate::atoms::logic::compare_values;
use crate::atoms::{AtomRegistry, EagerFn};
use crate::errors::ErrorReporting;

// ============================================================================
// LIST CONSTRUCTION AND ACCESS
// ============================================================================

/// Usage: (list <a> <b> ...)
pub const ATOM_LIST: EagerFn = |args, _context, _span| Ok(Value::List(args.to_vec()));

/// Length of a list, string or map.
pub const ATOM_LEN: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let len = match &args[0] {
        Value::List(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Map(map) => map.len(),
        other => {
            return Err(context.type_mismatch(
                "List, String or Map",
                other.type_name(),
                context.span_for_span(span),
            ))
        }
    };
    Ok(Value::Number(len as f64))
};

/// First element of a list, or nil when it is empty.
pub const ATOM_FIRST: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let items: Vec<Value> = args[0].extract(context, span)?;
    Ok(items.into_iter().next().unwrap_or_default())
};

/// All elements but the first.
pub const ATOM_REST: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let items: Vec<Value> = args[0].extract(context, span)?;
    Ok(Value::List(items.into_iter().skip(1).collect()))
};

/// Usage: (nth <list> <index>), zero-based.
pub const ATOM_NTH: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let items: Vec<Value> = args[0].extract(context, span)?;
    let index = extract_index(&args[1], context, span)?;
    items.get(index).cloned().ok_or_else(|| {
        context.invalid_operation(
            "nth",
            &format!("index {} of a list of length {}", index, items.len()),
            context.span_for_span(span),
        )
    })
};

/// Usage: (cons <item> <list>)
pub const ATOM_CONS: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let mut items: Vec<Value> = args[1].extract(context, span)?;
    items.insert(0, args[0].clone());
    Ok(Value::List(items))
};

/// Concatenates lists.
pub const ATOM_APPEND: EagerFn = |args, context, span| {
    let mut result = Vec::new();
    for arg in args {
        let items: Vec<Value> = arg.extract(context, span)?;
        result.extend(items);
    }
    Ok(Value::List(result))
};

/// Reverses a list or a string.
pub const ATOM_REVERSE: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    match &args[0] {
        Value::List(items) => Ok(Value::List(items.iter().rev().cloned().collect())),
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        other => Err(context.type_mismatch(
            "List or String",
            other.type_name(),
            context.span_for_span(span),
        )),
    }
};

/// Usage: (range <end>) | (range <start> <end>) | (range <start> <end> <step>)
///
/// Example:
///   (range 3)      ; => (0 1 2)
///   (range 5 0 -2) ; => (5 3 1)
pub const ATOM_RANGE: EagerFn = |args, context, span| {
    check_arity_range(args, 1, 3, context, span)?;
    let nums: Vec<f64> = args
        .iter()
        .map(|arg| ExtractValue::<f64>::extract(arg, context, span))
        .collect::<Result<_, _>>()?;
    let (start, end, step) = match nums.as_slice() {
        [end] => (0.0, *end, 1.0),
        [start, end] => (*start, *end, 1.0),
        [start, end, step] => (*start, *end, *step),
        _ => unreachable!("arity checked above"),
    };
    if step == 0.0 {
        return Err(context.invalid_operation("range", "zero step", context.span_for_span(span)));
    }
    let count = ((end - start) / step).ceil();
    if count.is_nan() || count > MAX_RANGE_LEN as f64 {
        return Err(context.invalid_operation(
            "range",
            "range too large",
            context.span_for_span(span),
        ));
    }
    let count = if count > 0.0 { count as usize } else { 0 };
    let items = (0..count)
        .map(|i| Value::Number(start + i as f64 * step))
        .collect();
    Ok(Value::List(items))
};

/// Upper bound on the number of elements `range` will build.
pub const MAX_RANGE_LEN: usize = 10_000_000;

/// True for nil and for empty lists, strings and maps.
pub const ATOM_EMPTY: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let empty = match &args[0] {
        Value::Nil => true,
        Value::List(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Map(map) => map.is_empty(),
        other => {
            return Err(context.type_mismatch(
                "List, String, Map or Nil",
                other.type_name(),
                context.span_for_span(span),
            ))
        }
    };
    Ok(Value::Bool(empty))
};

/// Usage: (contains? <collection> <item>)
///
/// Lists test membership, maps test for a key, strings test for a substring.
pub const ATOM_CONTAINS: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let found = match (&args[0], &args[1]) {
        (Value::List(items), item) => items.contains(item),
        (Value::Map(map), Value::String(key)) => map.contains_key(key),
        (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
        (collection, _) => {
            return Err(context.type_mismatch(
                "List, Map or String",
                collection.type_name(),
                context.span_for_span(span),
            ))
        }
    };
    Ok(Value::Bool(found))
};

/// Sorts a list of numbers or a list of strings in ascending order.
pub const ATOM_SORT: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let mut items: Vec<Value> = args[0].extract(context, span)?;
    let mut failure = None;
    items.sort_by(|a, b| match compare_values(a, b, context, span) {
        Ok(ordering) => ordering,
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(Value::List(items)),
    }
};

// ============================================================================
// HIGHER-ORDER OPERATIONS
// ============================================================================

/// Usage: (map <f> <list> ...)
///
/// With several lists, `f` receives one element of each and the result is
/// as long as the shortest list.
pub const ATOM_MAP: EagerFn = |args, context, span| {
    check_min_arity(args, 2, context, span)?;
    let f = &args[0];
    let lists = args[1..]
        .iter()
        .map(|arg| ExtractValue::<Vec<Value>>::extract(arg, context, span))
        .collect::<Result<Vec<_>, _>>()?;
    let len = lists.iter().map(Vec::len).min().unwrap_or(0);

    let mut result = Vec::with_capacity(len);
    for i in 0..len {
        let call_args: Vec<Value> = lists.iter().map(|list| list[i].clone()).collect();
        result.push(context.apply(f, &call_args, span)?);
    }
    Ok(Value::List(result))
};

/// Usage: (filter <predicate> <list>)
pub const ATOM_FILTER: EagerFn = |args, context, span| {
    check_arity(args, 2, context, span)?;
    let items: Vec<Value> = args[1].extract(context, span)?;
    let mut kept = Vec::new();
    for item in items {
        if context.apply(&args[0], std::slice::from_ref(&item), span)?.is_truthy() {
            kept.push(item);
        }
    }
    Ok(Value::List(kept))
};

/// Usage: (fold <f> <init> <list>), left fold calling `(f acc item)`.
pub const ATOM_FOLD: EagerFn = |args, context, span| {
    check_arity(args, 3, context, span)?;
    let items: Vec<Value> = args[2].extract(context, span)?;
    let mut acc = args[1].clone();
    for item in items {
        acc = context.apply(&args[0], &[acc, item], span)?;
    }
    Ok(acc)
};

/// Usage: (apply <f> <arg>... <list>), calls `f` with the leading arguments
/// followed by the elements of the final list.
pub const ATOM_APPLY: EagerFn = |args, context, span| {
    check_min_arity(args, 2, context, span)?;
    let Some((last, leading)) = args[1..].split_last() else {
        return Err(context.arity_mismatch("at least 2", args.len(), context.span_for_span(span)));
    };
    let spread: Vec<Value> = last.extract(context, span)?;
    let mut call_args = leading.to_vec();
    call_args.extend(spread);
    context.apply(&args[0], &call_args, span)
};

// ============================================================================
// MAPS
// ============================================================================

/// Usage: (map/new <key> <value> ...), keys are strings.
pub const ATOM_MAP_NEW: EagerFn = |args, context, span| {
    if args.len() % 2 != 0 {
        return Err(context.arity_mismatch(
            "an even number of",
            args.len(),
            context.span_for_span(span),
        ));
    }
    let mut map = OrdMap::new();
    for pair in args.chunks(2) {
        let key: String = pair[0].extract(context, span)?;
        map.insert(key, pair[1].clone());
    }
    Ok(Value::Map(map))
};

/// Usage: (map/get <map> <key> [default])
pub const ATOM_MAP_GET: EagerFn = |args, context, span| {
    check_arity_range(args, 2, 3, context, span)?;
    let map: OrdMap<String, Value> = args[0].extract(context, span)?;
    let key: String = args[1].extract(context, span)?;
    Ok(map
        .get(&key)
        .cloned()
        .or_else(|| args.get(2).cloned())
        .unwrap_or_default())
};

/// Usage: (map/set <map> <key> <value>), returns the updated map.
pub const ATOM_MAP_SET: EagerFn = |args, context, span| {
    check_arity(args, 3, context, span)?;
    let map: OrdMap<String, Value> = args[0].extract(context, span)?;
    let key: String = args[1].extract(context, span)?;
    Ok(Value::Map(map.update(key, args[2].clone())))
};

/// Keys of a map, in sorted order.
pub const ATOM_MAP_KEYS: EagerFn = |args, context, span| {
    check_arity(args, 1, context, span)?;
    let map: OrdMap<String, Value> = args[0].extract(context, span)?;
    Ok(Value::List(map.keys().cloned().map(Value::String).collect()))
};

pub fn register_collection_atoms(registry: &mut AtomRegistry) {
    registry.register_eager("list", ATOM_LIST);
    registry.register_eager("len", ATOM_LEN);
    registry.register_eager("first", ATOM_FIRST);
    registry.register_eager("rest", ATOM_REST);
    registry.register_eager("nth", ATOM_NTH);
    registry.register_eager("cons", ATOM_CONS);
    registry.register_eager("append", ATOM_APPEND);
    registry.register_eager("reverse", ATOM_REVERSE);
    registry.register_eager("range", ATOM_RANGE);
    registry.register_eager("empty?", ATOM_EMPTY);
    registry.register_eager("contains?", ATOM_CONTAINS);
    registry.register_eager("sort", ATOM_SORT);
    registry.register_eager("map", ATOM_MAP);
    registry.register_eager("filter", ATOM_FILTER);
    registry.register_eager("fold", ATOM_FOLD);
    registry.register_eager("apply", ATOM_APPLY);
    registry.register_eager("map/new", ATOM_MAP_NEW);
    registry.register_eager("map/get", ATOM_MAP_GET);
    registry.register_eager("map/set", ATOM_MAP_SET);
    registry.register_eager("map/keys", ATOM_MAP_KEYS);
}
