/*
 * ==========================================================================
 * RECSPL - Table-Driven Compiler Front End
 * ==========================================================================
 * 
 * Author:   Sam Wilcox
 * 
 * License:
 * This file is part of the RECSPL compiler front end project.
 * 
 * RECSPL is dual-licensed under the terms of:
 *   - The MIT license
 *   - The Apache License, Version 2.0
 * 
 * You may choose either license to govern your use of this software.
 * 
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * 
 * ==========================================================================
 */

//! End-to-end scenarios through the public pipeline.

use rstest::rstest;

use recspl::grammar::{Grammar, NonTerminal, ParsingTable, Terminal};
use recspl::lexer::{tokens_from_json, Token, TokenKind};
use recspl::semantic::{Type, GLOBAL_SCOPE};
use recspl::{
    compile, compile_tokens, compile_with, CompileError, CompilerConfig, DiagnosticPrinter,
    TypeError,
};

const NESTED: &str = "
main
num V_x ,
begin
  V_x = F_a ( 1 , 2 , 3 ) ;
  print V_x ;
end
num F_a ( V_p , V_q , V_r )
{
  num V_s , num V_t , text V_u ,
  begin
    V_s = F_b ( V_p , V_q , V_r ) ;
    return V_s ;
  end
}
  num F_b ( V_i , V_j , V_k )
  {
    num V_l , num V_m , num V_n ,
    begin
      V_l = mul ( V_i , V_s ) ;
      return V_l ;
    end
  }
  end
end
";

#[test]
fn empty_main_has_an_empty_instruction_list() {
    let compilation = compile("main begin end").unwrap();
    let tree = &compilation.tree;

    let prog = tree.child(tree.root(), 0).unwrap();
    assert_eq!(tree.label(prog), Some(NonTerminal::Prog));

    let algo = tree.child(prog, 2).unwrap();
    let parts: Vec<String> = tree
        .children(algo)
        .iter()
        .map(|id| match tree.token(*id) {
            Some(token) => token.lexeme.clone(),
            None => tree.label(*id).unwrap().to_string(),
        })
        .collect();

    assert_eq!(parts, vec!["begin", "INSTRUC", "end"]);
    let instruc = tree.child(algo, 1).unwrap();
    assert!(tree.children(instruc).is_empty());
}

#[test]
fn skip_needs_its_semicolon() {
    assert!(compile("main begin skip ; end").is_ok());
    assert_eq!(compile("main begin skip end").unwrap_err().code(), "E_SYNTAX");
}

#[test]
fn global_declaration_and_use() {
    let compilation = compile("main num V_x , begin V_x = 1 ; end").unwrap();
    let entry = compilation.analysis.symbols.get(0).unwrap();

    assert_eq!(entry.original_name, "V_x");
    assert_eq!(entry.kind, Type::Num);
    assert_eq!(entry.declaring_scope, GLOBAL_SCOPE);
    assert_eq!(entry.internal_name, "v1");
    assert_eq!(compilation.analysis.symbols.len(), 1);
}

#[test]
fn symbol_table_is_handed_on_as_json_and_text() {
    let compilation = compile("main num V_x , begin V_x = 1 ; end").unwrap();
    let symbols = &compilation.analysis.symbols;

    let json: serde_json::Value = serde_json::from_str(&symbols.to_json().unwrap()).unwrap();
    let entry = &json[0];
    assert_eq!(entry["original_name"], "V_x");
    assert_eq!(entry["kind"], "num");
    assert_eq!(entry["declaring_scope"], 0);
    assert_eq!(entry["internal_name"], "v1");
    assert_eq!(entry["enclosing_scope"], 0);
    assert_eq!(entry["is_subfunction"], false);
    assert_eq!(entry["is_function"], false);
    assert_eq!(json.as_array().map(Vec::len), Some(1));

    let listing = symbols.dump();
    assert_eq!(listing.lines().nth(1), Some("V_x   num   0      v1        0          false        false"));
}

#[test]
fn symbol_table_rows_follow_declaration_order() {
    let compilation = compile(NESTED).unwrap();
    let listing = compilation.analysis.symbols.dump();
    let internal: Vec<&str> = listing
        .lines()
        .skip(1)
        .filter_map(|row| row.split_whitespace().nth(3))
        .collect();

    assert_eq!(
        internal,
        vec!["v1", "f1", "v2", "v3", "v4", "v5", "v6", "v7", "f2", "v8", "v9", "v10", "v11", "v12", "v13"]
    );
}

#[test]
fn text_variable_assigned_a_number() {
    let err = compile("main text V_x , begin V_x = 1 ; end").unwrap_err();

    match err {
        CompileError::Type(TypeError::AssignmentMismatch {
            variable,
            expected,
            found,
            ..
        }) => {
            assert_eq!(variable, "V_x");
            assert_eq!(expected, Type::Text);
            assert_eq!(found, Type::Num);
        }
        other => panic!("expected an assignment mismatch, got {:?}", other),
    }
}

#[test]
fn nested_function_scopes() {
    let compilation = compile(NESTED).unwrap();
    let analysis = &compilation.analysis;

    let f_a = analysis.symbols.functions().find(|f| f.original_name == "F_a").unwrap();
    let f_b = analysis.symbols.functions().find(|f| f.original_name == "F_b").unwrap();

    assert_eq!(f_a.declaring_scope, 1);
    assert_eq!(analysis.scopes.parent(1), Some(GLOBAL_SCOPE));
    assert!(!f_a.is_subfunction);

    assert_eq!(f_b.declaring_scope, 2);
    assert_eq!(f_b.enclosing_scope, 1);
    assert!(f_b.is_subfunction);
    assert_eq!(analysis.scopes.chain(2).collect::<Vec<_>>(), vec![2, 1, 0]);
}

#[test]
fn missing_end_is_reported_at_eof() {
    let err = compile("main begin skip ;").unwrap_err();

    match err {
        CompileError::Syntax { state, token, .. } => {
            assert_eq!(state, 36);
            assert_eq!(token.kind, TokenKind::Eof);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[rstest]
#[case::lexical("main begin V_X = 1 ; end", "E_LEX")]
#[case::syntax("main num V_x begin end", "E_SYNTAX")]
#[case::undeclared_variable("main begin print V_y ; end", "E_SCOPE")]
#[case::undeclared_function("main begin F_g ( 1 , 2 , 3 ) ; end", "E_SCOPE")]
#[case::redeclared("main num V_x , num V_x , begin end", "E_SCOPE")]
#[case::return_in_main("main begin return 1 ; end", "E_TYPE")]
#[case::text_operand("main num V_x , begin V_x = add ( \"Hi\" , 1 ) ; end", "E_TYPE")]
fn failures_carry_their_code(#[case] source: &str, #[case] code: &str) {
    assert_eq!(compile(source).unwrap_err().code(), code);
}

#[rstest]
#[case("main begin end")]
#[case("main text V_s , begin V_s = \"Abcdefgh\" ; print V_s ; end")]
#[case("main num V_n , begin V_n = -3.25 ; V_n < input ; end")]
#[case(NESTED)]
fn accepted_programs_keep_every_token(#[case] source: &str) {
    let compilation = compile(source).unwrap();
    let frontier: Vec<Token> = compilation.tree.frontier().into_iter().cloned().collect();
    let (eof, scanned) = compilation.tokens.split_last().unwrap();

    assert!(eof.is_eof());
    assert_eq!(frontier.as_slice(), scanned);
}

#[test]
fn externally_scanned_tokens_compile() {
    let literal = |kind| Token::literal(kind).unwrap();
    let tokens = vec![
        literal(TokenKind::Main),
        literal(TokenKind::Num),
        Token::new(TokenKind::VName, "V_x"),
        literal(TokenKind::Comma),
        literal(TokenKind::Begin),
        Token::new(TokenKind::VName, "V_x"),
        literal(TokenKind::Assign),
        Token::new(TokenKind::Number, "2"),
        literal(TokenKind::Semicolon),
        literal(TokenKind::End),
        Token::eof(),
    ];

    let compilation = compile_tokens(tokens).unwrap();
    assert_eq!(compilation.analysis.symbols.len(), 1);
}

#[test]
fn token_streams_read_from_json() {
    let json = r#"[
        { "kind": "MAIN", "lexeme": "main" },
        { "kind": "BEGIN", "lexeme": "begin" },
        { "kind": "END", "lexeme": "end" },
        { "kind": "EOF", "lexeme": "" }
    ]"#;
    let tokens = tokens_from_json(json).unwrap();

    assert!(compile_tokens(tokens).is_ok());
}

#[test]
fn token_streams_with_unknown_kinds_are_rejected() {
    let json = r#"[
        { "kind": "WHILE", "lexeme": "while" },
        { "kind": "EOF", "lexeme": "" }
    ]"#;
    let err = tokens_from_json(json).unwrap_err();

    assert_eq!(err.code(), "E_ARTIFACT");
    assert!(matches!(err, CompileError::MalformedArtifact { line: Some(2), .. }));
}

#[test]
fn token_streams_without_eof_are_rejected_by_the_engine() {
    let json = r#"[{ "kind": "MAIN", "lexeme": "main" }]"#;
    let tokens = tokens_from_json(json).unwrap();

    assert_eq!(compile_tokens(tokens).unwrap_err().code(), "E_ARTIFACT");
}

#[test]
fn step_budget_applies_to_the_whole_pipeline() {
    let tight = CompilerConfig::default().with_max_steps(5);
    let err = compile_with("main begin skip ; end", &tight).unwrap_err();

    assert_eq!(err, CompileError::StepBudgetExceeded { limit: 5 });
    assert!(compile_with("main begin skip ; end", &CompilerConfig::default().with_max_steps(1000)).is_ok());
}

#[test]
fn shipped_table_survives_an_artifact_round_trip() {
    let table = ParsingTable::recspl().unwrap();
    let text = table.to_artifact();
    let reread = ParsingTable::from_artifact(&text, Grammar::recspl()).unwrap();

    assert_eq!(&reread, table);
    assert!(text.contains("1;$;ACTION;acc"));
    assert_eq!(reread.action(0, Terminal::Main).map(|a| a.to_string()), Some("s2".to_string()));
}

#[test]
fn diagnostics_point_into_the_source() {
    let source = "main\ntext V_x ,\nbegin\n  V_x = 1 ;\nend\n";
    let err = compile(source).unwrap_err();
    let report = DiagnosticPrinter::new("prog.rspl", source).render(&err);

    assert!(report.starts_with("error[E_TYPE]"));
    assert!(report.contains("--> prog.rspl:4:3"));
    assert!(report.contains("  4 |   V_x = 1 ;"));
}
