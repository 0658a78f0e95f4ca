use ilgen_dsl::mnemonic::InstructionRow;

/// Builds a stream from `(opcode, operand)` pairs. Keys start at 1.
///
/// An opcode of `#` makes a statement row whose text is the operand.
pub fn stream(rows: &[(&str, &str)]) -> Vec<InstructionRow> {
    rows.iter()
        .enumerate()
        .map(|(index, (opcode, operand))| {
            let key = index as u32 + 1;
            if *opcode == "#" {
                return InstructionRow::statement(key, *operand);
            }
            InstructionRow {
                key,
                step: index.to_string(),
                opcode: opcode.to_string(),
                operand: operand.to_string(),
                statement: None,
            }
        })
        .collect()
}

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
