use super::*;

fn recipe_serving(diners: usize, ingredients: &str, method: &str) -> String {
    format!(
        "Test Kitchen.\n\nIngredients.\n{ingredients}\n\nMethod.\n{method}\n\nServes {diners}.\n"
    )
}

fn cook(ingredients: &str, method: &str) -> Vec<String> {
    execute(&recipe_serving(1, ingredients, method)).unwrap()
}

fn cook_err(ingredients: &str, method: &str) -> RunError {
    execute(&recipe_serving(1, ingredients, method)).unwrap_err()
}

fn root_cause(error: &RunError) -> &OperationError {
    match error {
        RunError::StatementFailed { error: OperationError::SousChef(inner), .. } => {
            root_cause(inner)
        }
        RunError::StatementFailed { error, .. } => error,
        RunError::RunTooLong { .. } => panic!("expected a statement failure, got {error}"),
    }
}

const HELLO_WORLD: &str = "\
Hello World Souffle.

Ingredients.
72 g haricot beans
105 ml ice water

Method.
Put haricot beans into the mixing bowl. Put ice water into the mixing bowl.
Liquefy contents of the mixing bowl.
Pour contents of the mixing bowl into the baking dish.

Serves 1.
";

#[test]
fn test_empty_source_is_missing_its_method() {
    for source in ["", "\n\n\n"] {
        assert!(matches!(
            execute(source),
            Err(RunError::StatementFailed {
                error: OperationError::Parse(ParseError::MissingSection("Method")),
                ..
            })
        ));
    }
}

#[test]
fn test_recipe_without_serves() {
    let source = "\
Unfinished Pie.

Ingredients.
1 g flour

Method.
Put flour into the mixing bowl.
";
    assert!(matches!(
        execute(source),
        Err(RunError::StatementFailed {
            error: OperationError::Parse(ParseError::MissingSection("Serves")),
            ..
        })
    ));
}

#[test]
fn test_hello_world() {
    assert_eq!(execute(HELLO_WORLD).unwrap(), vec!["iH"]);
}

#[test]
fn test_execution_is_deterministic() {
    assert_eq!(execute(HELLO_WORLD).unwrap(), execute(HELLO_WORLD).unwrap());
}

#[test]
fn test_put_and_serve_renders_dry_as_decimal() {
    let dishes = cook(
        "42 g beans",
        "Put beans into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["42"]);
}

#[test]
fn test_add() {
    let dishes = cook(
        "2 g alpha\n3 g beta",
        "Put alpha into the mixing bowl. Add beta to the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["5"]);
}

#[test]
fn test_remove() {
    let dishes = cook(
        "10 g base\n3 g delta",
        "Put base into the mixing bowl. Remove delta from the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["7"]);
}

#[test]
fn test_combine() {
    let dishes = cook(
        "10 g base\n3 g factor",
        "Put base into the mixing bowl. Combine factor into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["30"]);
}

#[test]
fn test_divide_truncates_toward_zero() {
    let dishes = cook(
        "10 g base\n3 g divisor",
        "Put base into the mixing bowl. Divide divisor into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["3"]);

    let dishes = cook(
        "-7 g base\n2 g divisor",
        "Put base into the mixing bowl. Divide divisor into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["-3"]);
}

#[test]
fn test_division_by_zero() {
    let error = cook_err(
        "10 g base\n0 g divisor",
        "Put base into the mixing bowl. Divide divisor into the mixing bowl.",
    );
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::DivisionByZero, .. }
    ));
}

#[test]
fn test_add_dry_ingredients_sums_in_declaration_order() {
    // Only the dry ingredients count: 1 + 2, not the 3 ml of liquid.
    let dishes = cook(
        "1 g alpha\n2 g beta\n3 ml gamma",
        "Add dry ingredients to the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["3"]);
}

#[test]
fn test_fold_pops_value_and_measure() {
    // Folding a liquid cell into a dry-declared ingredient makes it liquid.
    let dishes = cook(
        "72 ml water\nblank",
        "Put water into the mixing bowl. Fold blank into the mixing bowl. \
         Put blank into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["H"]);
}

#[test]
fn test_put_then_fold_restores_the_ingredient() {
    let dishes = cook(
        "5 g alpha",
        "Put alpha into the mixing bowl. Put alpha into the mixing bowl. \
         Fold alpha into the mixing bowl. Put alpha into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // Push, push, pop, push: two cells of the original value.
    assert_eq!(dishes, vec!["55"]);
}

#[test]
fn test_liquefy_renders_cells_as_characters() {
    let dishes = cook(
        "72 g letter",
        "Put letter into the mixing bowl. Liquefy contents of the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["H"]);
}

#[test]
fn test_liquefy_is_idempotent() {
    let dishes = cook(
        "72 g letter",
        "Put letter into the mixing bowl. Liquefy contents of the mixing bowl. \
         Liquefy contents of the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["H"]);
}

#[test]
fn test_liquefy_ingredient_form_targets_the_bowl() {
    let dishes = cook(
        "72 g letter",
        "Put letter into the mixing bowl. Liquefy letter. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["H"]);
}

#[test]
fn test_stir_rolls_the_top_cell_down() {
    let dishes = cook(
        "1 g one\n2 g two\n3 g three",
        "Put one into the mixing bowl. Put two into the mixing bowl. \
         Put three into the mixing bowl. Stir for 1 minutes. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // Bowl bottom-to-top is [1, 3, 2]; dishes pop top first.
    assert_eq!(dishes, vec!["231"]);
}

#[test]
fn test_stir_caps_at_the_bottom() {
    let dishes = cook(
        "1 g one\n2 g two\n3 g three",
        "Put one into the mixing bowl. Put two into the mixing bowl. \
         Put three into the mixing bowl. Stir for 10 minutes. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["213"]);
}

#[test]
fn test_stir_ingredient_uses_its_value() {
    let dishes = cook(
        "1 g one\n2 g two\n3 g three\n1 pinch spice",
        "Put one into the mixing bowl. Put two into the mixing bowl. \
         Put three into the mixing bowl. Stir spice into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["231"]);
}

#[test]
fn test_clean_empties_the_bowl() {
    let dishes = cook(
        "1 g one\n2 g two",
        "Put one into the mixing bowl. Put one into the mixing bowl. \
         Clean mixing bowl. Put two into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["2"]);
}

#[test]
fn test_pour_from_a_cleaned_bowl_fails() {
    let error = cook_err(
        "1 g one",
        "Put one into the mixing bowl. Clean mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::EmptyBowl { bowl: 1 }, .. }
    ));
}

#[test]
fn test_pour_appends_without_draining_the_bowl() {
    let dishes = cook(
        "1 g one\n2 g two",
        "Put one into the mixing bowl. Put two into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // Dish bottom-to-top is [1, 2, 1, 2].
    assert_eq!(dishes, vec!["2121"]);
}

#[test]
fn test_second_bowl_and_dish() {
    let source = recipe_serving(
        2,
        "1 g one\n2 g two",
        "Put one into the 1st mixing bowl. Put two into the 2nd mixing bowl. \
         Pour contents of the 1st mixing bowl into the 1st baking dish. \
         Pour contents of the 2nd mixing bowl into the 2nd baking dish.",
    );
    assert_eq!(execute(&source).unwrap(), vec!["1", "2"]);
}

#[test]
fn test_loop_runs_guard_value_times() {
    let dishes = cook(
        "3 cups counter\n1 g flour",
        "Cook the counter. Put flour into the mixing bowl. Bake until cooked. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["111"]);
}

#[test]
fn test_loop_with_named_decrement_target() {
    // The until clause decrements `fuel`; the body counts `counter` down
    // through the 2nd mixing bowl.
    let dishes = cook(
        "2 cups counter\n5 g fuel\n1 g one",
        "Cook the counter. Put counter into the 2nd mixing bowl. \
         Remove one from the 2nd mixing bowl. \
         Fold counter into the 2nd mixing bowl. \
         Bake the fuel until baked. \
         Put fuel into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // Two passes, so fuel drops from 5 to 3 and the guard is untouched by
    // the back edge.
    assert_eq!(dishes, vec!["3"]);
}

#[test]
fn test_nested_loops_pair_lexically() {
    let dishes = cook(
        "2 g outer\n2 g inner\n1 g flour",
        "Cook the outer. Mash the inner. Put flour into the mixing bowl. \
         Bake until mashed. Shake until cooked. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // First outer pass runs the inner loop twice, the second finds the
    // inner guard exhausted and runs it once more.
    assert_eq!(dishes, vec!["111"]);
}

#[test]
fn test_set_aside_skips_the_rest_of_the_loop() {
    let dishes = cook(
        "5 cups counter\n1 g flour",
        "Cook the counter. Set aside. Put flour into the mixing bowl. \
         Bake until cooked. Put counter into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    // The loop exits before the body runs and without touching the guard.
    assert_eq!(dishes, vec!["5"]);
}

#[test]
fn test_set_aside_outside_a_loop_is_a_no_op() {
    let dishes = cook(
        "1 g one",
        "Set aside. Put one into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, vec!["1"]);
}

const SOUS_CHEF: &str = "\
Main Course.

Ingredients.
10 g beans

Method.
Put beans into the mixing bowl. Serve with sauce.
Pour contents of the mixing bowl into the baking dish.

Serves 1.

Sauce.

Ingredients.
20 g cream

Method.
Put cream into the mixing bowl. Refrigerate.
";

#[test]
fn test_sous_chef_appends_its_first_bowl() {
    // The sous-chef sees a copy of the caller's bowl [10], pushes 20, and
    // hands [10, 20] back to be appended: [10, 10, 20], served top first.
    assert_eq!(execute(SOUS_CHEF).unwrap(), vec!["201010"]);
}

#[test]
fn test_unknown_auxiliary_recipe() {
    let error = cook_err("1 g one", "Serve with mystery sauce.");
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::UnknownRecipe(title), .. }
            if title == "mystery sauce"
    ));
}

#[test]
fn test_sous_chef_recursion_is_capped() {
    let source = "\
Fork Bomb.

Ingredients.
1 g fuel

Method.
Serve with fork bomb.

Serves 1.
";
    let options = Options { max_sous_chef_depth: 4, ..Options::default() };
    let error = execute_with_options(source, options).unwrap_err();
    assert!(matches!(
        root_cause(&error),
        OperationError::TooManySousChefs { limit: 4 }
    ));
}

#[test]
fn test_refrigerate_with_hours_serves_early() {
    let dishes = cook(
        "10 g beans",
        "Put beans into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish. \
         Refrigerate for 1 hours. Put beans into the mixing bowl.",
    );
    // Output comes from Refrigerate; the trailing statements and the
    // `Serves` line are never reached.
    assert_eq!(dishes, vec!["10"]);
}

#[test]
fn test_refrigerate_without_hours_serves_nothing() {
    let dishes = cook(
        "10 g beans",
        "Put beans into the mixing bowl. Refrigerate. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert_eq!(dishes, Vec::<String>::new());
}

#[test]
fn test_unknown_ingredient() {
    let error = cook_err("1 g flour", "Put ghost into the mixing bowl.");
    let RunError::StatementFailed { index, statement, error } = error else {
        panic!("expected a statement failure");
    };
    assert_eq!(index, 7);
    assert_eq!(statement, "Put ghost into the mixing bowl");
    assert!(matches!(error, OperationError::UnknownIngredient(name) if name == "ghost"));
}

#[test]
fn test_ingredient_without_a_value() {
    let error = cook_err("sugar", "Put sugar into the mixing bowl.");
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::UndefinedIngredient(name), .. }
            if name == "sugar"
    ));
}

#[test]
fn test_arithmetic_on_an_empty_bowl() {
    let error = cook_err("1 g flour", "Add flour to the mixing bowl.");
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::EmptyBowl { bowl: 1 }, .. }
    ));
}

#[test]
fn test_missing_bowl_anchor() {
    let error = cook_err("1 g flour", "Put flour into the bowl.");
    assert!(matches!(
        error,
        RunError::StatementFailed {
            error: OperationError::Parse(ParseError::MissingAnchor { verb: "Put", .. }),
            ..
        }
    ));
}

#[test]
fn test_take_and_mix_are_unsupported() {
    let error = cook_err("1 g flour", "Take flour from refrigerator.");
    assert!(matches!(
        error,
        RunError::StatementFailed {
            error: OperationError::Parse(ParseError::UnsupportedOp(_)),
            ..
        }
    ));
}

#[test]
fn test_loop_without_until() {
    let error = cook_err("1 g flour", "Cook the flour. Put flour into the mixing bowl.");
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::UnmatchedLoop, .. }
    ));
}

#[test]
fn test_serves_more_dishes_than_prepared() {
    let source = recipe_serving(
        2,
        "1 g flour",
        "Put flour into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    let error = execute(&source).unwrap_err();
    assert!(matches!(
        error,
        RunError::StatementFailed {
            error: OperationError::NotEnoughDishes { required: 2, available: 1 },
            ..
        }
    ));
}

#[test]
fn test_invalid_character_in_a_liquid_cell() {
    let error = cook_err(
        "-1 ml venom",
        "Put venom into the mixing bowl. \
         Pour contents of the mixing bowl into the baking dish.",
    );
    assert!(matches!(
        error,
        RunError::StatementFailed { error: OperationError::InvalidCharacter(-1), .. }
    ));
}

#[test]
fn test_statement_budget() {
    let options = Options { max_statements: 3, ..Options::default() };
    assert!(matches!(
        execute_with_options(HELLO_WORLD, options),
        Err(RunError::RunTooLong { statements_run: 3 })
    ));
}

#[test]
fn test_oven_and_cooking_time_lines_are_ignored() {
    let source = "\
Patient Loaf.

Ingredients.
7 g flour

Cooking time: 25 minutes.

Pre-heat oven to 180 degrees Celsius.

Method.
Put flour into the mixing bowl.
Pour contents of the mixing bowl into the baking dish.

Serves 1.
";
    assert_eq!(execute(source).unwrap(), vec!["7"]);
}
