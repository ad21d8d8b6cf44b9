// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use indexmap::IndexMap;
use pontoon_engine::execute::QueryContext;
use pontoon_engine::table_function::{
	TableFunction, TableFunctionBindInput, TableFunctionInitInput, TableFunctionMode, TableFunctionScanNode, bind,
	init_global, init_local, scan,
};
use pontoon_foreign::Session;
use pontoon_testing::{TestRuntime, test_session};
use pontoon_type::Value;

fn tuples_function(
	session: &Session,
	runtime: &TestRuntime,
	name: &str,
	rows: Vec<Vec<Value>>,
	schema: &[(&str, &str)],
) -> TableFunction {
	TableFunction::from_callable(
		session,
		name,
		runtime.returning_rows(rows),
		None,
		&runtime.schema(schema),
		TableFunctionMode::Tuples,
	)
	.unwrap()
}

fn drain_single_column(node: &mut TableFunctionScanNode) -> (Vec<Value>, Vec<usize>) {
	let mut values = Vec::new();
	let mut batch_sizes = Vec::new();
	while let Some(batch) = node.next().unwrap() {
		let (rows, _) = batch.columns.shape();
		batch_sizes.push(rows);
		for row in 0..rows {
			values.push(batch.columns[0].data().get_value(row));
		}
	}
	(values, batch_sizes)
}

#[test]
fn test_three_rows_in_order_then_exhausted() {
	let (session, runtime, _) = test_session();
	let function = tuples_function(
		&session,
		&runtime,
		"gen",
		vec![vec![Value::Int4(1)], vec![Value::Int4(2)], vec![Value::Int4(3)]],
		&[("a", "INTEGER")],
	);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let (values, _) = drain_single_column(&mut node);
	assert_eq!(values, vec![Value::Int4(1), Value::Int4(2), Value::Int4(3)]);

	// Terminal state is idempotent
	assert!(node.next().unwrap().is_none());
	assert!(node.next().unwrap().is_none());
}

#[test]
fn test_multi_column_rows_convert_per_declared_type() {
	let (session, runtime, _) = test_session();
	let function = tuples_function(
		&session,
		&runtime,
		"gen",
		vec![
			vec![Value::Utf8("name_0".to_string()), Value::Int4(0)],
			vec![Value::Utf8("name_1".to_string()), Value::Int4(1)],
		],
		&[("name", "VARCHAR"), ("id", "BIGINT")],
	);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let batch = node.next().unwrap().unwrap();
	assert_eq!(batch.columns.shape(), (2, 2));
	assert_eq!(batch.columns[0].name().text(), "name");
	assert_eq!(batch.columns[1].name().text(), "id");
	assert_eq!(batch.columns.get_row(0), vec![Value::Utf8("name_0".to_string()), Value::Int8(0)]);
	assert_eq!(batch.columns.get_row(1), vec![Value::Utf8("name_1".to_string()), Value::Int8(1)]);
}

#[test]
fn test_batches_respect_cap_and_preserve_order() {
	let (session, runtime, _) = test_session();
	let total = 2500usize;
	let rows = (0..total).map(|i| vec![Value::Int8(i as i64)]).collect();
	let function = tuples_function(&session, &runtime, "gen", rows, &[("id", "BIGINT")]);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let (values, batch_sizes) = drain_single_column(&mut node);
	assert_eq!(values.len(), total);
	assert!(batch_sizes.iter().all(|&size| size <= 1024));
	assert_eq!(batch_sizes, vec![1024, 1024, 452]);

	for (i, value) in values.iter().enumerate() {
		assert_eq!(value, &Value::Int8(i as i64));
	}
}

#[test]
fn test_single_foreign_call_per_invocation() {
	let (session, runtime, _) = test_session();
	let rows = (0..3000).map(|i| vec![Value::Int8(i)]).collect();
	let function = tuples_function(&session, &runtime, "gen", rows, &[("id", "BIGINT")]);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();
	drain_single_column(&mut node);

	assert_eq!(runtime.call_count(), 1);
}

#[test]
fn test_raw_scan_is_idempotent_after_exhaustion() {
	let (session, runtime, _) = test_session();
	let function = tuples_function(
		&session,
		&runtime,
		"gen",
		vec![vec![Value::Int4(1)], vec![Value::Int4(2)], vec![Value::Int4(3)]],
		&[("a", "INTEGER")],
	);

	let mut ctx = QueryContext::with_batch_size(2);
	let bind_data = bind(&mut ctx, TableFunctionBindInput {
		function: &function,
		args: vec![],
		named: IndexMap::new(),
	})
	.unwrap();

	let input = TableFunctionInitInput::new(bind_data.clone());
	let global = init_global(&session, &input).unwrap();
	let mut local = init_local(&session, &global).unwrap();

	// Exhaustion mid-batch keeps the rows gathered so far
	assert_eq!(scan(&session, &ctx, &bind_data, &global, &mut local).unwrap().row_count(), 2);
	assert_eq!(scan(&session, &ctx, &bind_data, &global, &mut local).unwrap().row_count(), 1);
	assert_eq!(scan(&session, &ctx, &bind_data, &global, &mut local).unwrap().row_count(), 0);
	assert_eq!(scan(&session, &ctx, &bind_data, &global, &mut local).unwrap().row_count(), 0);
}

#[test]
fn test_positional_and_named_arguments_reach_the_callable() {
	let (session, runtime, _) = test_session();

	let builder = runtime.clone();
	let callable = runtime.callable(move |args, kwargs| {
		let count = kwargs
			.iter()
			.find(|(name, _)| name == "count")
			.map(|(_, value)| value.clone())
			.or_else(|| args.first().cloned())
			.and_then(|value| value.as_signed())
			.unwrap_or(0);
		let rows = (0..count).map(|i| vec![Value::Int8(i as i64)]).collect();
		Ok(Some(builder.rows(rows)))
	});

	let function = TableFunction::from_callable(
		&session,
		"gen",
		callable,
		Some(vec!["count".to_string()]),
		&runtime.schema(&[("id", "BIGINT")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	// Named argument
	let mut named = IndexMap::new();
	named.insert("count".to_string(), Value::Int4(4));
	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], named).unwrap();
	let (values, _) = drain_single_column(&mut node);
	assert_eq!(values.len(), 4);

	// Positional argument
	let mut node = TableFunctionScanNode::new(
		session.clone(),
		QueryContext::new(),
		&function,
		vec![Value::Int4(2)],
		IndexMap::new(),
	)
	.unwrap();
	let (values, _) = drain_single_column(&mut node);
	assert_eq!(values, vec![Value::Int8(0), Value::Int8(1)]);
}

#[test]
fn test_raising_callable_fails_with_foreign_text() {
	let (session, runtime, _) = test_session();
	let function = TableFunction::from_callable(
		&session,
		"gen",
		runtime.raising_callable("division by zero"),
		None,
		&runtime.schema(&[("id", "INT")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_012");
	assert!(err.0.message.contains("division by zero"));
}

#[test]
fn test_none_result_fails_before_any_row() {
	let (session, runtime, _) = test_session();
	let function = TableFunction::from_callable(
		&session,
		"gen",
		runtime.returning_none(),
		None,
		&runtime.schema(&[("id", "INT")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_006");
	assert_eq!(runtime.call_count(), 1);
}

#[test]
fn test_non_iterable_result_fails_at_init() {
	let (session, runtime, _) = test_session();

	let scalar = runtime.scalar(42);
	let callable = runtime.callable(move |_, _| Ok(Some(scalar.clone())));
	let function = TableFunction::from_callable(
		&session,
		"gen",
		callable,
		None,
		&runtime.schema(&[("id", "INT")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_007");
	assert!(err.0.message.contains("gen"));
}

#[test]
fn test_conversion_failure_carries_function_and_foreign_text() {
	let (session, runtime, _) = test_session();
	let function = tuples_function(
		&session,
		&runtime,
		"gen",
		vec![vec![Value::Utf8("not a number".to_string())]],
		&[("id", "INTEGER")],
	);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_008");
	assert!(err.0.message.contains("gen"));
	assert!(err.0.message.contains("cannot convert"));
}

#[test]
fn test_short_row_fails_with_invalid_row() {
	let (session, runtime, _) = test_session();
	let function = tuples_function(
		&session,
		&runtime,
		"gen",
		vec![vec![Value::Int4(1)]],
		&[("a", "INTEGER"), ("b", "INTEGER")],
	);

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_008");
	assert!(err.0.message.contains("index out of range"));
}

#[test]
fn test_mid_iteration_raise_is_fatal_and_preserves_text() {
	let (session, runtime, _) = test_session();

	let rows: Vec<_> = (0..5).map(|i| runtime.row(vec![Value::Int4(i)])).collect();
	let result = runtime.failing_sequence(rows, 2, "worker exploded");
	let callable = runtime.callable(move |_, _| Ok(Some(result.clone())));

	let function = TableFunction::from_callable(
		&session,
		"gen",
		callable,
		None,
		&runtime.schema(&[("id", "INTEGER")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();

	let err = node.next().unwrap_err();
	assert_eq!(err.code(), "TVF_012");
	assert!(err.0.message.contains("worker exploded"));
}

#[test]
fn test_result_objects_released_under_lock() {
	let (session, runtime, _) = test_session();

	// The callable builds its result fresh per invocation, so every
	// handle the bridge touches is released during this invocation
	let builder = runtime.clone();
	let callable = runtime
		.callable(move |_, _| Ok(Some(builder.rows(vec![vec![Value::Int4(1)], vec![Value::Int4(2)]]))));

	let function = TableFunction::from_callable(
		&session,
		"gen",
		callable,
		None,
		&runtime.schema(&[("id", "INT")]),
		TableFunctionMode::Tuples,
	)
	.unwrap();

	let mut node =
		TableFunctionScanNode::new(session.clone(), QueryContext::new(), &function, vec![], IndexMap::new())
			.unwrap();
	let (values, _) = drain_single_column(&mut node);
	assert_eq!(values.len(), 2);
	drop(node);

	// The result sequence and both pulled rows went under the lock
	assert!(runtime.releases_under_lock() >= 3);
	assert!(!session.runtime().lock().is_locked());
}
