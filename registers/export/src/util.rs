// Licensed under the Apache-2.0 license

//! Identifier and literal formatting shared by the emitters.

use std::path::Path;

/// Builds an upper-case macro name from its parts, `CHIP_CTRL`.
///
/// Anything that is not ASCII alphanumeric becomes an underscore, and a
/// leading digit gets an underscore prefix.
///
/// # Examples
/// ```
/// use registers_export::util::macro_name;
/// assert_eq!(macro_name(&["chip", "ctrl"]), "CHIP_CTRL");
/// assert_eq!(macro_name(&["ctrl", "enable", "MASK"]), "CTRL_ENABLE_MASK");
/// assert_eq!(macro_name(&["2nd", "reg.x"]), "_2ND_REG_X");
/// ```
pub fn macro_name(parts: &[&str]) -> String {
    let mut result = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i != 0 {
            result.push('_');
        }
        result.extend(part.chars().map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        }));
    }
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Include guard keyed to a header's file name, `__CHIP_REGS_H__`.
pub fn include_guard(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("__{}__", macro_name(&[&name]))
}

/// Lower-case hex with a `0x` prefix.
pub fn hex(val: u64) -> String {
    format!("0x{val:x}")
}

/// SystemVerilog-style hex literal, `'h1c`.
pub fn sv_hex(val: u64) -> String {
    format!("'h{val:x}")
}

/// Number of hex digits needed to print every offset below `size`.
pub fn address_digits(size: u64) -> usize {
    let bits = 64 - size.leading_zeros() as usize;
    bits.div_ceil(4).max(1)
}

/// Makes `name` usable as a SystemVerilog identifier.
///
/// # Examples
/// ```
/// use registers_export::util::sv_ident;
/// assert_eq!(sv_ident("ctrl"), "ctrl");
/// assert_eq!(sv_ident("class"), "class_");
/// assert_eq!(sv_ident("0th"), "_0th");
/// ```
pub fn sv_ident(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    tweak_keywords(&result).to_string()
}

/// Appends an underscore to SystemVerilog keywords.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "begin" => "begin_",
        "bit" => "bit_",
        "byte" => "byte_",
        "class" => "class_",
        "config" => "config_",
        "const" => "const_",
        "default" => "default_",
        "do" => "do_",
        "end" => "end_",
        "enum" => "enum_",
        "event" => "event_",
        "extends" => "extends_",
        "final" => "final_",
        "for" => "for_",
        "foreach" => "foreach_",
        "function" => "function_",
        "if" => "if_",
        "import" => "import_",
        "initial" => "initial_",
        "input" => "input_",
        "int" => "int_",
        "integer" => "integer_",
        "interface" => "interface_",
        "local" => "local_",
        "logic" => "logic_",
        "module" => "module_",
        "new" => "new_",
        "null" => "null_",
        "output" => "output_",
        "package" => "package_",
        "rand" => "rand_",
        "real" => "real_",
        "reg" => "reg_",
        "return" => "return_",
        "static" => "static_",
        "string" => "string_",
        "struct" => "struct_",
        "super" => "super_",
        "task" => "task_",
        "this" => "this_",
        "type" => "type_",
        "virtual" => "virtual_",
        "void" => "void_",
        "while" => "while_",
        "wire" => "wire_",
        s => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard(Path::new("out/chip_regs.h")), "__CHIP_REGS_H__");
        assert_eq!(include_guard(Path::new("chip.svh")), "__CHIP_SVH__");
    }

    #[test]
    fn test_literals() {
        assert_eq!(hex(0), "0x0");
        assert_eq!(hex(0x1c), "0x1c");
        assert_eq!(sv_hex(0x1000), "'h1000");
    }

    #[test]
    fn test_address_digits() {
        assert_eq!(address_digits(0), 1);
        assert_eq!(address_digits(0xf), 1);
        assert_eq!(address_digits(0x10), 2);
        assert_eq!(address_digits(0x100), 3);
        assert_eq!(address_digits(0x1_0000), 5);
    }

    #[test]
    fn test_sv_ident() {
        assert_eq!(sv_ident("reg"), "reg_");
        assert_eq!(sv_ident("a-b"), "a_b");
        assert_eq!(sv_ident("entry"), "entry");
    }
}
