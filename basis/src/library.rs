//! Embedded STO-3G basis data (NWChem format, Basis Set Exchange export).

const STO3G_H: &str = "\
H    S
      3.42525091             0.15432897
      0.62391373             0.53532814
      0.16885540             0.44463454
";

const STO3G_HE: &str = "\
He    S
      6.36242139             0.15432897
      1.15892300             0.53532814
      0.31364979             0.44463454
";

const STO3G_LI: &str = "\
Li    S
     16.1195750              0.15432897
      2.9362007              0.53532814
      0.7946505              0.44463454
Li    SP
      0.6362897             -0.09996723             0.15591627
      0.1478601              0.39951283             0.60768372
      0.0480887              0.70011547             0.39195739
";

const STO3G_BE: &str = "\
Be    S
     30.1678710              0.15432897
      5.4951153              0.53532814
      1.4871927              0.44463454
Be    SP
      1.3148331             -0.09996723             0.15591627
      0.3055389              0.39951283             0.60768372
      0.0993707              0.70011547             0.39195739
";

const STO3G_B: &str = "\
B    S
     48.7911130              0.15432897
      8.8873622              0.53532814
      2.4052670              0.44463454
B    SP
      2.2369561             -0.09996723             0.15591627
      0.5198205              0.39951283             0.60768372
      0.1690618              0.70011547             0.39195739
";

const STO3G_C: &str = "\
C    S
     71.6168370              0.15432897
     13.0450960              0.53532814
      3.5305122              0.44463454
C    SP
      2.9412494             -0.09996723             0.15591627
      0.6834831              0.39951283             0.60768372
      0.2222899              0.70011547             0.39195739
";

const STO3G_N: &str = "\
N    S
     99.1061690              0.15432897
     18.0523120              0.53532814
      4.8856602              0.44463454
N    SP
      3.7804559             -0.09996723             0.15591627
      0.8784966              0.39951283             0.60768372
      0.2857144              0.70011547             0.39195739
";

const STO3G_O: &str = "\
O    S
    130.7093200              0.15432897
     23.8088610              0.53532814
      6.4436083              0.44463454
O    SP
      5.0331513             -0.09996723             0.15591627
      1.1695961              0.39951283             0.60768372
      0.3803890              0.70011547             0.39195739
";

const STO3G_F: &str = "\
F    S
    166.6791300              0.15432897
     30.3608120              0.53532814
      8.2168207              0.44463454
F    SP
      6.4648032             -0.09996723             0.15591627
      1.5022812              0.39951283             0.60768372
      0.4885885              0.70011547             0.39195739
";

/// STO-3G block for an element symbol, if it is bundled.
pub fn sto3g(symbol: &str) -> Option<&'static str> {
    match symbol {
        "H" => Some(STO3G_H),
        "He" => Some(STO3G_HE),
        "Li" => Some(STO3G_LI),
        "Be" => Some(STO3G_BE),
        "B" => Some(STO3G_B),
        "C" => Some(STO3G_C),
        "N" => Some(STO3G_N),
        "O" => Some(STO3G_O),
        "F" => Some(STO3G_F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::sto3g;

    #[test]
    fn test_bundled_elements() {
        for symbol in ["H", "He", "Li", "Be", "B", "C", "N", "O", "F"] {
            let text = sto3g(symbol).expect("bundled element");
            assert!(text.starts_with(symbol));
        }
        assert!(sto3g("Ne").is_none());
        assert!(sto3g("h").is_none());
    }
}
