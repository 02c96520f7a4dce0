/// Synthetic path the prelude runs under.
pub const PRELUDE_PATH: &str = "<prelude>";

/// Helpers written in Scrip itself, loaded before every program.
pub const PRELUDE: &str = r#"# Scrip prelude
def abs(x)
  if x < 0
    return -x
  end
  return x
end

def max(a, b)
  if a < b
    return b
  end
  return a
end

def min(a, b)
  if b < a
    return b
  end
  return a
end
"#;
