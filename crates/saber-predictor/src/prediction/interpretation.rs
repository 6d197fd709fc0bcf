use super::area::KnowledgeArea;
use super::bands::ScoreBands;
use super::level::PerformanceLevel;
use serde::Serialize;

pub const SELECT_AREA_PLACEHOLDER: &str =
    "Selecciona un área del conocimiento para ver la interpretación de los niveles de desempeño.";
pub const SELECT_LEVEL_PLACEHOLDER: &str =
    "Selecciona un nivel de desempeño para ver la interpretación.";

const MATHEMATICS: [&str; 4] = [
    "El estudiante que se ubica en este nivel probablemente puede leer información puntual (un dato, por ejemplo) relacionada con situaciones cotidianas y presentada en tablas o gráficas con escala explícita, cuadrícula o, por lo menos, líneas horizontales.",
    "Además de lo descrito en el nivel 1, el estudiante que se ubica en este nivel es capaz de comparar y establecer relaciones entre los datos presentados, e identificar y extraer información local y global de manera directa. Lo anterior en contextos familiares o personales que involucran gráficas con escala explícita, cuadrícula o, por lo menos, líneas horizontales u otros formatos con poca información.",
    "Además de lo descrito en los niveles 1 y 2, el estudiante que se ubica en este nivel selecciona información, señala errores y hace distintos tipos de transformaciones y manipulaciones aritméticas y algebraicas sencillas; esto para enfrentarse a problemas que involucran el uso de conceptos de proporcionalidad, factores de conversión, áreas y desarrollos planos, en contextos laborales u ocupacionales, matemáticos o científicos, y comunitarios o sociales.",
    "Además de lo descrito en los niveles 1, 2 y 3, el estudiante que se ubica en este nivel resuelve problemas y justifica la veracidad o falsedad de afirmaciones que requieren el uso de conceptos de probabilidad, propiedades algebraicas, relaciones trigonométricas y características de funciones reales. Lo anterior, en contextos principalmente matemáticos o científicos abstractos.",
];

const NATURAL_SCIENCES: [&str; 4] = [
    "El estudiante que se ubica en este nivel muy posiblemente alcanza a reconocer información explícita, presentada de manera ordenada en tablas o gráficas, con un lenguaje cotidiano y que implica la lectura de una sola variable independiente. Por lo tanto, estos estudiantes demuestran un insuficiente desarrollo de la competencia *Indagación* definida en el marco teórico de la prueba.",
    "Además de lo descrito en el nivel 1, el estudiante que se ubica en este nivel reconoce información suministrada en tablas, gráficas y esquemas de una sola variable independiente, y la asocia con nociones de los conceptos básicos de las ciencias naturales (*tiempo, posición, velocidad, imantación y filtración*).",
    "Además de lo descrito en los niveles 1 y 2, el estudiante que se ubica en este nivel interrelaciona conceptos, leyes y teorías científicas con información presentada en diversos contextos, en los que intervienen dos o más variables, para hacer inferencias sobre una situación problema o un fenómeno natural.",
    "Además de lo descrito en los niveles 1, 2 y 3, el estudiante que se ubica en este nivel usa conceptos, teorías o leyes en la solución de situaciones problema que involucran procedimientos, habilidades, conocimientos y un lenguaje propio de las ciencias naturales.",
];

const SOCIAL_SCIENCES: [&str; 4] = [
    "El estudiante que se ubica en este nivel podría reconocer algunos derechos ciudadanos en situaciones sencillas. Adicionalmente, podría reconocer factores que generan un conflicto e identificar creencias que explican algunos comportamientos.",
    "Además de lo descrito en el nivel anterior, el estudiante que se ubica en este nivel reconoce deberes del Estado colombiano y situaciones de protección o vulneración de derechos en el marco del Estado social de derecho; identifica relaciones entre conductas de las personas y sus cosmovisiones; y reconoce las dimensiones presentes en una situación, problema, decisión tomada o propuesta de solución. Además, contextualiza fuentes y procesos sociales.",
    "Además de lo descrito en los niveles anteriores, el estudiante que se ubica en este nivel identifica prejuicios o intenciones contenidos en una afirmación y reconoce las dimensiones e intereses involucrados en un problema o alternativa de solución. Asimismo, identifica algunos conceptos básicos de las ciencias sociales y modelos conceptuales, y valora y contextualiza la información presentada en una fuente.",
    "Además de lo descrito en los niveles anteriores, el estudiante que se ubica en este nivel conoce algunas disposiciones de la Constitución Política de Colombia que posibilitan la participación ciudadana y el control a los poderes públicos; analiza y compara enunciados, intereses y argumentos; y evalúa alternativas de solución a un problema.\nEste estudiante analiza situaciones a partir de conceptos básicos de las ciencias sociales o de contextos históricos y/o geográficos. A su vez, relaciona fuentes y políticas con modelos conceptuales, y valora los contenidos de una fuente.",
];

const CRITICAL_READING: [&str; 4] = [
    "El estudiante que se ubica en este nivel probablemente identifica elementos literales en textos continuos y discontinuos sin establecer relaciones de significado.",
    "Además de lo que logra hacer en el nivel 1, el estudiante que se ubica en este nivel comprende textos continuos y discontinuos de manera literal. Asimismo, reconoce información explícita y la relaciona con el contexto.",
    "Además de lo descrito en los niveles 1 y 2, el estudiante que se ubica en este nivel interpreta información de textos al inferir contenidos implícitos y reconocer estructuras, estrategias discursivas y juicios valorativos.",
    "Además de lo descrito en los niveles 1, 2 y 3, el estudiante que se ubica en este nivel reflexiona a partir de un texto sobre la visión de mundo del autor (costumbres, creencias, juicios, carácter ideológico-político y posturas éticas, entre otros). Asimismo, da cuenta de elementos paratextuales significativos presentes en el texto. Finalmente, valora y contrasta los elementos mencionados.",
];

const ENGLISH: [&str; 5] = [
    "El estudiante promedio clasificado en este nivel probablemente puede comprender algunas oraciones simples como preguntas o instrucciones, y utilizar vocabulario básico para nombrar personas u objetos que le son familiares.",
    "Además de lo descrito en el nivel A-, el estudiante que se clasifica en este nivel puede comprender situaciones comunicativas sencillas y concretas en las que se haga uso de expresiones básicas para proporcionar información personal, y fórmulas de saludo, despedida, indicaciones de lugares, etc.",
    "Además de lo descrito en los niveles A- y A1, el estudiante que se clasifica en este nivel puede comprender información específica en textos sencillos cotidianos, además de comunicarse mediante el uso de expresiones de uso diario para realizar y responder invitaciones, sugerencias, disculpas, etc.",
    "Además de lo descrito en los niveles A-, A1 y A2, el estudiante que se clasifica en este nivel posee un amplio vocabulario para comprender textos de temáticas específicas que son de su interés personal. De igual manera, el estudiante en este nivel logra comunicarse con cierta seguridad en asuntos que le son poco habituales, y puede expresar y comprender diversas opiniones y actitudes.",
    "El estudiante promedio clasificado en este nivel supera las preguntas de mayor complejidad de la prueba. Este estudiante, además de lo descrito en los niveles A-, A1, A2 y B1, probablemente puede comprender textos y discursos sobre temáticas abstractas, gracias a que posee un amplio vocabulario de lectura. Asimismo, el estudiante probablemente puede comunicarse en diferentes contextos generales o académicos de manera espontánea.",
];

const GLOBAL: [&str; 5] = [
    "El puntaje global del estudiante se ubica en el quintil más bajo de la prueba. Es probable que su desempeño se concentre en el nivel 1 de la mayoría de las áreas, con dificultades para interpretar información que no esté presentada de forma explícita.",
    "El puntaje global del estudiante se ubica en el segundo quintil. Es probable que alcance el nivel 2 en algunas áreas: reconoce información explícita y establece relaciones directas entre datos, aunque todavía con dificultad para hacer inferencias.",
    "El puntaje global del estudiante se ubica en el quintil central. Su desempeño probablemente combina niveles 2 y 3: relaciona información de distintas fuentes y resuelve problemas sencillos en contextos familiares.",
    "El puntaje global del estudiante se ubica en el cuarto quintil. Es probable que alcance el nivel 3 en la mayoría de las áreas: infiere contenidos implícitos, aplica conceptos disciplinares y argumenta sus respuestas.",
    "El puntaje global del estudiante se ubica en el quintil más alto de la prueba. Es probable que alcance los niveles superiores en la mayoría de las áreas: resuelve problemas abstractos, evalúa argumentos y usa con solvencia los conceptos de cada disciplina.",
];

/// Display text for a predicted level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    /// Score-range heading; empty for placeholders.
    pub heading: String,
    pub text: String,
    pub placeholder: bool,
}

impl Interpretation {
    fn placeholder(text: &str) -> Self {
        Self {
            heading: String::new(),
            text: text.to_string(),
            placeholder: true,
        }
    }
}

fn table(area: KnowledgeArea) -> &'static [&'static str] {
    match area {
        KnowledgeArea::Mathematics => &MATHEMATICS,
        KnowledgeArea::NaturalSciences => &NATURAL_SCIENCES,
        KnowledgeArea::SocialSciences => &SOCIAL_SCIENCES,
        KnowledgeArea::CriticalReading => &CRITICAL_READING,
        KnowledgeArea::English => &ENGLISH,
        KnowledgeArea::Global => &GLOBAL,
    }
}

/// Looks up the explanation for `(area, level)`; out-of-domain inputs get a placeholder.
pub fn interpret(
    area: Option<KnowledgeArea>,
    level: PerformanceLevel,
    bands: &ScoreBands,
) -> Interpretation {
    let Some(area) = area else {
        return Interpretation::placeholder(SELECT_AREA_PLACEHOLDER);
    };
    if !level.within(area) {
        return Interpretation::placeholder(SELECT_LEVEL_PLACEHOLDER);
    }

    let index = usize::from(level.get()) - 1;
    let Some(text) = table(area).get(index) else {
        return Interpretation::placeholder(SELECT_LEVEL_PLACEHOLDER);
    };

    let label = area
        .level_label(level.get())
        .unwrap_or_else(|| level.to_string());
    let heading = match bands.band(area, level.get()) {
        Some(band) => format!(
            "Nivel {label}: puntaje entre {} y {}",
            band.min_score, band.max_score
        ),
        None => format!("Nivel {label}"),
    };

    Interpretation {
        heading,
        text: format!("- {text}"),
        placeholder: false,
    }
}
