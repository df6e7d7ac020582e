//! Interpreter behavior tests
//!
//! Language semantics exercised through the embedding facade: operator
//! precedence, scope rules for blocks vs. calls, closure capture,
//! try/catch recovery, templates, and builtin behavior. Statements that
//! talk to stdout/stdin are covered by the CLI end-to-end suite instead.

use pretty_assertions::assert_eq;
use sayso_runtime::{Sayso, Value};

fn eval(source: &str) -> Value {
    let runtime = Sayso::new();
    runtime
        .eval(source)
        .unwrap_or_else(|diagnostics| panic!("eval failed for {:?}: {:?}", source, diagnostics))
}

fn eval_err_code(source: &str) -> String {
    let runtime = Sayso::new();
    let diagnostics = runtime
        .eval(source)
        .expect_err(&format!("expected failure for {:?}", source));
    diagnostics[0].code.clone()
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|&i| Value::int(i)).collect())
}

// ============================================================================
// Literals and numbers
// ============================================================================

#[test]
fn test_integer_and_float_chosen_lexically() {
    assert_eq!(eval("5"), Value::int(5));
    assert_eq!(eval("5.0"), Value::float(5.0));
    assert_eq!(eval("0.25"), Value::float(0.25));
}

#[test]
fn test_boolean_literals() {
    assert_eq!(eval("yes"), Value::Bool(true));
    assert_eq!(eval("no"), Value::Bool(false));
}

#[test]
fn test_division_is_always_float() {
    assert_eq!(eval("6 / 3"), Value::float(2.0));
    assert_eq!(eval("7 / 2"), Value::float(3.5));
}

#[test]
fn test_integer_arithmetic_stays_integral() {
    assert_eq!(eval("2 + 3 * 4"), Value::int(14));
    assert_eq!(eval("2.0 + 3"), Value::float(5.0));
}

// ============================================================================
// Operator precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(eval("1 + 2 * 3"), Value::int(7));
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(eval("(1 + 2) * 3"), Value::int(9));
}

#[test]
fn test_comparison_of_arithmetic() {
    assert_eq!(eval("1 + 2 == 3"), Value::Bool(true));
    assert_eq!(eval("2 * 3 > 5"), Value::Bool(true));
}

#[test]
fn test_concatenation_is_loosest() {
    assert_eq!(eval(r#""total: " .. 1 + 2"#), Value::string("total: 3"));
}

// ============================================================================
// Concatenation and display strings
// ============================================================================

#[test]
fn test_concat_works_on_any_kinds() {
    assert_eq!(eval(r#"1 .. 2"#), Value::string("12"));
    assert_eq!(eval(r#"[1, 2] .. "!""#), Value::string("[1, 2]!"));
    assert_eq!(eval(r#"yes .. """#), Value::string("yes"));
}

#[test]
fn test_end_to_end_remember_and_concat() {
    assert_eq!(
        eval("remember 5 as x\nx .. \" items\""),
        Value::string("5 items")
    );
}

// ============================================================================
// Comparisons are total
// ============================================================================

#[test]
fn test_cross_kind_comparison_never_raises() {
    // Numbers rank before strings, strings before booleans
    assert_eq!(eval(r#"1 < "a""#), Value::Bool(true));
    assert_eq!(eval(r#""a" < yes"#), Value::Bool(true));
    assert_eq!(eval(r#"1 == "1""#), Value::Bool(false));
}

#[test]
fn test_numeric_comparison_across_representations() {
    assert_eq!(eval("1 == 1.0"), Value::Bool(true));
    assert_eq!(eval("2 >= 1.5"), Value::Bool(true));
}

// ============================================================================
// Scope rules
// ============================================================================

#[test]
fn test_conditional_bodies_share_enclosing_scope() {
    // A name assigned inside a conditional is visible after the block
    let source = "
        remember 1 as x
        if yes then remember 2 as x end
        x
    ";
    assert_eq!(eval(source), Value::int(2));
}

#[test]
fn test_loop_variable_visible_after_loop() {
    let source = "
        for each n in [1, 2, 3] do n end
        n
    ";
    assert_eq!(eval(source), Value::int(3));
}

#[test]
fn test_function_frame_shadows_instead_of_mutating() {
    // Writes inside a call frame go to the frame, not the caller's scope
    let source = "
        remember 1 as x
        when bump()
            add 1 to x
        end
        bump()
        x
    ";
    assert_eq!(eval(source), Value::int(1));
}

#[test]
fn test_named_functions_do_not_capture_definition_scope() {
    // The free name is defined after the function, before the call
    let source = "
        when f()
            return y
        end
        remember 5 as y
        f()
    ";
    assert_eq!(eval(source), Value::int(5));
}

#[test]
fn test_closures_capture_definition_scope() {
    // The lambda's free name lives in make's frame, long gone at the
    // call site
    let source = "
        when make()
            remember 10 as secret
            remember lambda () -> return secret end as getter
            return getter
        end
        remember make() as g
        g()
    ";
    assert_eq!(eval(source), Value::int(10));
}

#[test]
fn test_closure_arguments_bind_positionally() {
    let source = "
        remember lambda (a, b) -> return a + b end as plus
        plus(2, 3)
    ";
    assert_eq!(eval(source), Value::int(5));
}

#[test]
fn test_lambda_statement_is_a_no_op() {
    let source = "
        lambda (x) -> return x end
        5
    ";
    assert_eq!(eval(source), Value::int(5));
}

// ============================================================================
// Compound assignment
// ============================================================================

#[test]
fn test_compound_assignment_forms() {
    assert_eq!(eval("remember 10 as x\nadd 5 to x\nx"), Value::int(15));
    assert_eq!(eval("remember 10 as x\nsubtract 4 from x\nx"), Value::int(6));
    assert_eq!(eval("remember 10 as x\nmultiply x by 3\nx"), Value::int(30));
    assert_eq!(eval("remember 10 as x\ndivide x by 4\nx"), Value::float(2.5));
}

#[test]
fn test_compound_assignment_requires_existing_binding() {
    assert_eq!(eval_err_code("add 1 to ghost"), "SY2000");
}

#[test]
fn test_compound_divide_by_zero_fails() {
    assert_eq!(eval_err_code("remember 1 as x\ndivide x by 0"), "SY2004");
}

#[test]
fn test_compound_assignment_rejects_non_numbers() {
    assert_eq!(eval_err_code("remember \"a\" as s\nadd 1 to s"), "SY2003");
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn test_if_else_branches() {
    assert_eq!(
        eval("remember 0 as r\nif 1 is greater than 2 then remember 1 as r else remember 2 as r end\nr"),
        Value::int(2)
    );
}

#[test]
fn test_truthiness_of_conditions() {
    assert_eq!(eval("remember 0 as r\nif [] then remember 1 as r end\nr"), Value::int(0));
    assert_eq!(eval("remember 0 as r\nif \"x\" then remember 1 as r end\nr"), Value::int(1));
}

#[test]
fn test_worded_comparisons() {
    assert_eq!(eval("remember 0 as r\nif 3 is not less than 3 then remember 1 as r end\nr"), Value::int(1));
    assert_eq!(eval("remember 0 as r\nif 3 is equal to 3 then remember 1 as r end\nr"), Value::int(1));
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_for_each_over_list() {
    let source = "
        remember 0 as total
        for each n in [1, 2, 3] do
            add n to total
        end
        total
    ";
    assert_eq!(eval(source), Value::int(6));
}

#[test]
fn test_for_each_over_string_iterates_characters() {
    let source = r#"
        remember "" as acc
        for each c in "abc" do
            remember acc .. c .. "-" as acc
        end
        acc
    "#;
    assert_eq!(eval(source), Value::string("a-b-c-"));
}

#[test]
fn test_for_each_over_mapping_iterates_keys() {
    let source = r#"
        remember "" as acc
        for each k in {"a": 1, "b": 2} do
            remember acc .. k as acc
        end
        acc
    "#;
    assert_eq!(eval(source), Value::string("ab"));
}

#[test]
fn test_for_each_pair_preserves_insertion_order() {
    let source = r#"
        remember "" as acc
        for each k, v in {"b": 2, "a": 1} do
            remember acc .. k .. v as acc
        end
        acc
    "#;
    assert_eq!(eval(source), Value::string("b2a1"));
}

#[test]
fn test_for_each_requires_iterable() {
    assert_eq!(eval_err_code("for each x in 5 do x end"), "SY2003");
}

#[test]
fn test_for_each_pair_requires_mapping() {
    assert_eq!(eval_err_code("for each k, v in [1, 2] do k end"), "SY2003");
}

// ============================================================================
// Functions and calls
// ============================================================================

#[test]
fn test_function_call_returns_value() {
    let source = "
        when double(n)
            return n * 2
        end
        double(21)
    ";
    assert_eq!(eval(source), Value::int(42));
}

#[test]
fn test_call_without_return_yields_nothing() {
    let source = "
        when quiet()
            remember 1 as x
        end
        quiet()
    ";
    assert_eq!(eval(source), Value::Nothing);
}

#[test]
fn test_return_unwinds_through_nested_blocks() {
    let source = "
        when find()
            for each n in [1, 2, 3] do
                if n == 2 then
                    return n
                end
            end
            return 99
        end
        find()
    ";
    assert_eq!(eval(source), Value::int(2));
}

#[test]
fn test_missing_required_argument_fails() {
    assert_eq!(eval_err_code("when f(a)\nreturn a\nend\nf()"), "SY2005");
}

#[test]
fn test_extra_arguments_to_fixed_function_are_ignored() {
    let source = "
        when first(a)
            return a
        end
        first(1, 2, 3)
    ";
    assert_eq!(eval(source), Value::int(1));
}

#[test]
fn test_calling_undefined_name_fails() {
    assert_eq!(eval_err_code("nope()"), "SY2001");
}

#[test]
fn test_calling_non_callable_fails() {
    assert_eq!(eval_err_code("remember 5 as x\nx()"), "SY2002");
}

#[test]
fn test_zero_argument_call_is_valid() {
    let source = "
        when five()
            return 5
        end
        five()
    ";
    assert_eq!(eval(source), Value::int(5));
}

#[test]
fn test_remember_renames_callable() {
    let runtime = Sayso::new();
    runtime
        .eval("when f()\nreturn 1\nend\nremember f as g")
        .unwrap();
    assert_eq!(
        runtime.eval("to_string(g)").unwrap(),
        Value::string("<fn g>")
    );
}

#[test]
fn test_recursive_function() {
    let source = "
        when fact(n)
            if n is less than 2 then
                return 1
            end
            return n * fact(n - 1)
        end
        fact(5)
    ";
    assert_eq!(eval(source), Value::int(120));
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_substitutes_innermost_binding() {
    assert_eq!(
        eval("remember 7 as n\n\"{n} left\""),
        Value::string("7 left")
    );
}

#[test]
fn test_template_ignores_outer_bindings() {
    // `x` is bound only in the enclosing scope, not the call frame, so
    // the placeholder stays unsubstituted
    let source = r#"
        remember 5 as x
        when show()
            return "{x} here"
        end
        show()
    "#;
    assert_eq!(eval(source), Value::string("{x} here"));
}

#[test]
fn test_template_leaves_unknown_placeholders() {
    assert_eq!(eval(r#""{ghost}!""#), Value::string("{ghost}!"));
}

#[test]
fn test_template_multiple_placeholders() {
    let source = r#"
        remember "Ada" as name
        remember 3 as count
        "{name} has {count}"
    "#;
    assert_eq!(eval(source), Value::string("Ada has 3"));
}

// ============================================================================
// Try / catch
// ============================================================================

#[test]
fn test_try_catch_switches_to_catch_body() {
    let source = "
        remember 0 as count
        try
            add 1 to count
            ghost()
            add 10 to count
        if_it_fails
            add 100 to count
        end
        count
    ";
    // Side effects before the failure are retained; the rest of the
    // try-body is skipped; the catch-body runs exactly once
    assert_eq!(eval(source), Value::int(101));
}

#[test]
fn test_try_catch_intercepts_nested_call_failures() {
    let source = "
        when boom()
            return 1 / 0
        end
        remember 0 as r
        try
            boom()
        if_it_fails
            remember 9 as r
        end
        r
    ";
    assert_eq!(eval(source), Value::int(9));
}

#[test]
fn test_try_without_failure_skips_catch() {
    let source = "
        remember 0 as r
        try
            remember 1 as r
        if_it_fails
            remember 2 as r
        end
        r
    ";
    assert_eq!(eval(source), Value::int(1));
}

#[test]
fn test_failure_in_catch_body_propagates() {
    let source = "
        try
            ghost()
        if_it_fails
            1 / 0
        end
    ";
    assert_eq!(eval_err_code(source), "SY2004");
}

#[test]
fn test_return_is_not_caught_by_try() {
    let source = "
        when f()
            try
                return 1
            if_it_fails
                return 2
            end
            return 3
        end
        f()
    ";
    assert_eq!(eval(source), Value::int(1));
}

// ============================================================================
// Builtins through the language
// ============================================================================

#[test]
fn test_sort_reverse_round_trip() {
    assert_eq!(eval("reverse(sort([3, 1, 2]))"), ints(&[3, 2, 1]));
    assert_eq!(eval("sort(reverse(sort([3, 1, 2])))"), ints(&[1, 2, 3]));
}

#[test]
fn test_length_builtin() {
    assert_eq!(eval("length([1, 2, 3])"), Value::int(3));
    assert_eq!(eval(r#"length("hello")"#), Value::int(5));
    assert_eq!(eval(r#"length({"a": 1})"#), Value::int(1));
}

#[test]
fn test_min_max_builtins() {
    assert_eq!(eval("min(3, 1, 2)"), Value::int(1));
    assert_eq!(eval("max([3, 1, 2])"), Value::int(3));
}

#[test]
fn test_to_number_and_to_string() {
    assert_eq!(eval(r#"to_number("2.5")"#), Value::float(2.5));
    assert_eq!(eval("to_number(5)"), Value::float(5.0));
    assert_eq!(eval("to_string(42) .. \"!\""), Value::string("42!"));
}

#[test]
fn test_to_number_failure_is_catchable() {
    let source = r#"
        remember 0 as r
        try
            to_number("abc")
        if_it_fails
            remember 1 as r
        end
        r
    "#;
    assert_eq!(eval(source), Value::int(1));
}

// ============================================================================
// Doc wrapper
// ============================================================================

#[test]
fn test_doc_records_text_and_executes_statement() {
    let runtime = Sayso::new();
    let result = runtime
        .eval("doc \"doubles a number\" when double(n)\nreturn n * 2\nend\ndouble(4)")
        .unwrap();
    assert_eq!(result, Value::int(8));
    assert_eq!(
        runtime.global("_doc_double"),
        Some(Value::string("doubles a number"))
    );
}

// ============================================================================
// Mapping values
// ============================================================================

#[test]
fn test_map_lookup_unifies_numeric_keys() {
    // 1 and 1.0 are the same key
    let source = r#"
        remember {1: "one"} as m
        for each k, v in m do
            remember v as found
        end
        found
    "#;
    assert_eq!(eval(source), Value::string("one"));
}

#[test]
fn test_duplicate_map_keys_keep_last_value() {
    let source = r#"
        remember {"a": 1, "a": 2} as m
        length(m)
    "#;
    assert_eq!(eval(source), Value::int(1));
}
