//! Line-buffered driver around the lexer, parser and evaluator (§4.5).

use std::io::{BufRead, Write};

use crate::environment::Environment;

const INITIAL_PROMPT: &str = "-- Type 'exit' to close the repl.\n----------\n";
const PROMPT: &str = ">> ";

/// The "CAN I HAS NO BUGZ PLEASE?!" banner shown ahead of parser diagnostics
/// (§4.5; preserved verbatim as cosmetic flavor text, not re-specified).
const CAT_BUG: &str = "CAN I HAS NO BUGZ PLEASE?!\n\
       _                        \n\
       \\`*-.                    \n\
        )  _`-.                 \n\
       .  : `. .                \n\
       : _   '  \\               \n\
       ; *` _.   `*-._          \n\
       `-.-'          `-.       \n\
         ;       `       `.     \n\
         :.       .        \\    \n\
         . \\  .   :   .-'   .   \n\
         '  `+.;  ;  '      :   \n\
         :  '  |    ;       ;-. \n\
         ; '   : :`-:     _.`* ;\n\
[bug] .*' /  .*' ; .*`- +'  `*' \n\
      `*-*   `*-*  `*-*'\n";

/// Runs the read-eval-print loop against `reader`/`writer`, preseeded with
/// `repopath="."` and the given `tickets` binding.
pub fn start<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, tickets: &str) -> std::io::Result<()> {
    let env = Environment::with_params(tickets);

    writeln!(writer, "{}", crate::version::get())?;
    write!(writer, "{}", INITIAL_PROMPT)?;

    let mut line = String::new();
    loop {
        write!(writer, "{}", PROMPT)?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let line = line.trim_end_matches(['\n', '\r']);

        if line == "exit" {
            return Ok(());
        }

        let (program, errors) = crate::parser::parse(line);
        if !errors.is_empty() {
            print_parser_errors(writer, &errors)?;
            continue;
        }

        let evaluated = crate::eval::eval_program(&program, &env);
        if !matches!(evaluated, crate::object::Value::Null) {
            writeln!(writer, "{}", evaluated.inspect())?;
        }
    }
}

fn print_parser_errors<W: Write>(writer: &mut W, errors: &[String]) -> std::io::Result<()> {
    write!(writer, "{}", CAT_BUG)?;
    writeln!(writer, " parser errors:")?;
    for msg in errors {
        writeln!(writer, "\t{}", msg)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn exit_terminates_without_evaluating() {
        let mut input = Cursor::new(b"exit\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output, "*").unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains(INITIAL_PROMPT));
    }

    #[test]
    fn valid_expression_prints_inspected_value() {
        let mut input = Cursor::new(b"5 + 5\nexit\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output, "*").unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("10"));
    }

    #[test]
    fn null_result_is_suppressed() {
        let mut input = Cursor::new(b"\nprint(1)\nexit\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output, "*").unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(!rendered.lines().any(|line| line == "null"));
    }

    #[test]
    fn parse_error_renders_banner_and_diagnostic() {
        let mut input = Cursor::new(b"1 +\nexit\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output, "*").unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("parser errors:"));
        assert!(rendered.contains("no prefix parse function for EOF found"));
    }

    #[test]
    fn eof_on_stdin_terminates_the_loop() {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        start(&mut input, &mut output, "*").unwrap();
    }
}
